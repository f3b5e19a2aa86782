use crate::core::FieldName;

/// Notifications for the host application (progress breadcrumbs, analytics-free
/// logging, test assertions). Drained with [`super::Wizard::take_events`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEvent {
    StepChanged { from: usize, to: usize },
    ValidationFailed { step: usize, fields: usize },
    OptionsLoaded { field: FieldName, count: usize },
    OptionsFailed { field: FieldName, message: String },
    ChoiceAutoSelected { field: FieldName },
    SubmissionStarted { run_id: u64 },
    SubmissionSucceeded { run_id: u64 },
    SubmissionRejected { run_id: u64, step: Option<usize> },
    StaleCompletionIgnored { run_id: u64 },
    Restarted,
    Unmounted,
}
