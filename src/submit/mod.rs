pub mod api;
pub mod payload;
pub mod run_state;

pub use api::{ApiError, GENERIC_FAILURE_MESSAGE, SubmissionApi};
pub use payload::{FieldEmit, PayloadMapping, ReverseMapping};
pub use run_state::SubmissionRunState;
