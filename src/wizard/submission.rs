use super::navigation::is_global_only;
use super::{Wizard, WizardEvent, WizardPhase};
use crate::context::{Toast, ToastLevel};
use crate::error::{Result, WizardError};
use crate::state::error_map::ErrorMap;
use crate::submit::api::errors_from_failure;
use crate::submit::{ApiError, GENERIC_FAILURE_MESSAGE, SubmissionApi};
use crate::validation::{validate_all, validate_step};
use serde_json::Value as Json;
use tracing::{info, warn};

pub const SUCCESS_MESSAGE: &str = "Your submission has been saved.";

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionTicket {
    pub run_id: u64,
    pub payload: Json,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitStart {
    Started(SubmissionTicket),
    NotStarted(SubmitOutcome),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Succeeded(Json),
    /// The backend reported field errors; `step` is where the user was sent.
    Rejected { step: Option<usize>, errors: ErrorMap },
    /// Non-field failure, shown as a banner. Retry is allowed.
    Failed { message: String },
    /// The final local check failed before anything was sent.
    Invalid { step: usize, errors: ErrorMap },
    AlreadySubmitting,
    AlreadySucceeded,
    /// The answer belonged to an abandoned or superseded run.
    Ignored,
}

impl Wizard {
    /// Runs the final local check and, if it passes, opens a submission run.
    ///
    /// While a run is open every further call returns
    /// `NotStarted(AlreadySubmitting)`, so double clicks never reach the API.
    pub fn begin_submit(&mut self) -> Result<SubmitStart> {
        match self.phase {
            WizardPhase::Unmounted => return Err(WizardError::NotMounted),
            WizardPhase::Submitting { .. } => {
                return Ok(SubmitStart::NotStarted(SubmitOutcome::AlreadySubmitting));
            }
            WizardPhase::Succeeded { .. } => {
                return Ok(SubmitStart::NotStarted(SubmitOutcome::AlreadySucceeded));
            }
            WizardPhase::Editing => {}
        }
        if let Some((field, message)) = self.blocking_error() {
            return Err(WizardError::config(format!(
                "options for '{field}' failed to load: {message}"
            )));
        }

        if let Some(errors) = validate_all(&self.definition.registry, &self.definition.schema, &self.store) {
            let step = self.first_invalid_step()?.unwrap_or_else(|| self.flow.current_index());
            self.check_step(step)?;
            self.move_flow(step, false);
            info!(step, fields = errors.len(), "submission blocked by local validation");
            return Ok(SubmitStart::NotStarted(SubmitOutcome::Invalid { step, errors }));
        }

        let Some(run_id) = self.runs.try_start() else {
            return Ok(SubmitStart::NotStarted(SubmitOutcome::AlreadySubmitting));
        };
        self.store.errors_mut().clear_global();
        let payload = self.definition.payload.serialize(self.store.values());
        self.phase = WizardPhase::Submitting { run_id };
        self.events.push(WizardEvent::SubmissionStarted { run_id });
        info!(wizard = %self.definition.name, run_id, "submission started");
        Ok(SubmitStart::Started(SubmissionTicket { run_id, payload }))
    }

    /// Applies the API's answer for `run_id`. Answers for runs that are no
    /// longer current, or that arrive after unmount, are dropped.
    pub fn complete_submit(&mut self, run_id: u64, result: std::result::Result<Json, ApiError>) -> Result<SubmitOutcome> {
        if self.phase == WizardPhase::Unmounted || !self.runs.finish(run_id) {
            warn!(run_id, "ignoring stale submission result");
            self.events.push(WizardEvent::StaleCompletionIgnored { run_id });
            return Ok(SubmitOutcome::Ignored);
        }

        match result {
            Ok(data) => {
                self.flow.complete_current();
                self.phase = WizardPhase::Succeeded { data: data.clone() };
                self.events.push(WizardEvent::SubmissionSucceeded { run_id });
                self.notifier.notify(Toast {
                    level: ToastLevel::Success,
                    message: SUCCESS_MESSAGE.to_string(),
                });
                info!(wizard = %self.definition.name, run_id, "submission succeeded");
                Ok(SubmitOutcome::Succeeded(data))
            }
            Err(error) => {
                self.phase = WizardPhase::Editing;
                let errors = errors_from_failure(&error, &self.reverse);
                self.store.errors_mut().extend(errors.clone());
                info!(run_id, %error, fields = errors.len(), "submission rejected");

                if is_global_only(&errors) {
                    let message = errors
                        .global_message()
                        .unwrap_or(GENERIC_FAILURE_MESSAGE)
                        .to_string();
                    self.notifier.notify(Toast {
                        level: ToastLevel::Error,
                        message: message.clone(),
                    });
                    self.events.push(WizardEvent::SubmissionRejected { run_id, step: None });
                    return Ok(SubmitOutcome::Failed { message });
                }

                let step = self.route_to_first_error(&errors)?;
                if let Some(message) = errors.global_message() {
                    self.notifier.notify(Toast {
                        level: ToastLevel::Error,
                        message: message.to_string(),
                    });
                }
                self.events.push(WizardEvent::SubmissionRejected { run_id, step });
                Ok(SubmitOutcome::Rejected { step, errors })
            }
        }
    }

    pub async fn submit(&mut self, api: &dyn SubmissionApi) -> Result<SubmitOutcome> {
        match self.begin_submit()? {
            SubmitStart::Started(ticket) => {
                let result = api.submit(ticket.payload).await;
                self.complete_submit(ticket.run_id, result)
            }
            SubmitStart::NotStarted(outcome) => Ok(outcome),
        }
    }

    pub fn result(&self) -> Option<&Json> {
        match &self.phase {
            WizardPhase::Succeeded { data } => Some(data),
            _ => None,
        }
    }

    fn first_invalid_step(&self) -> Result<Option<usize>> {
        for index in 0..self.definition.registry.len() {
            if validate_step(&self.definition.registry, &self.definition.schema, index, &self.store)?.is_some() {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }
}
