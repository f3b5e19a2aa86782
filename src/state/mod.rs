pub mod error_map;
pub mod flow;
pub mod registry;
pub mod step;
pub mod store;
