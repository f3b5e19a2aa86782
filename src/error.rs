use crate::core::FieldName;
use thiserror::Error;

/// Failures that are not user-correctable validation problems.
///
/// Validation results travel as [`crate::state::error_map::ErrorMap`] data; this
/// type covers programming and configuration mistakes plus calls made while the
/// wizard cannot accept them.
#[derive(Error, Debug)]
pub enum WizardError {
    /// An error was reported for a field that no step declares.
    #[error("field '{0}' is owned by no step")]
    FieldNotOwned(FieldName),
    #[error("step index {index} is out of range (wizard has {len} steps)")]
    UnknownStep { index: usize, len: usize },
    #[error("invalid field path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },
    #[error("invalid wizard configuration: {0}")]
    Config(String),
    #[error("a submission is already in flight")]
    SubmissionInFlight,
    #[error("the wizard has been unmounted")]
    NotMounted,
    #[error("could not read wizard configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl WizardError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

pub type Result<T> = std::result::Result<T, WizardError>;
