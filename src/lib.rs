pub mod config;
pub mod context;
pub mod core;
pub mod definition;
pub mod error;
pub mod flows;
pub mod options;
pub mod state;
pub mod submit;
pub mod terminal;
pub mod validation;
pub mod wizard;

pub use crate::core::FieldName;
pub use crate::core::value::Value;
pub use definition::WizardDefinition;
pub use error::{Result, WizardError};
pub use state::error_map::ErrorMap;
pub use wizard::Wizard;
