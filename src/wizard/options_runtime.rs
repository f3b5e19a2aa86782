use super::{Wizard, WizardEvent, WizardPhase};
use crate::core::FieldName;
use crate::error::{Result, WizardError};
use crate::options::{Choice, OptionsLoader, OptionsState};
use crate::submit::ApiError;
use tracing::{debug, info, warn};

impl Wizard {
    pub fn pending_option_fields(&self) -> Vec<FieldName> {
        self.options
            .iter()
            .filter(|(_, state)| matches!(state, OptionsState::Loading))
            .map(|(field, _)| field.clone())
            .collect()
    }

    /// Whether every option field has its choices. Steps cannot be rendered before.
    pub fn is_ready(&self) -> bool {
        self.options
            .values()
            .all(|state| matches!(state, OptionsState::Ready(_)))
    }

    pub fn blocking_error(&self) -> Option<(&FieldName, &str)> {
        self.options.iter().find_map(|(field, state)| match state {
            OptionsState::Failed(message) => Some((field, message.as_str())),
            _ => None,
        })
    }

    pub fn options_state(&self, field: &str) -> Option<&OptionsState> {
        self.options.get(field)
    }

    pub fn choices(&self, field: &str) -> Option<&[Choice]> {
        self.options.get(field).and_then(OptionsState::choices)
    }

    /// Records the outcome of loading `field`'s choices.
    ///
    /// A single choice is selected automatically when the field is still blank
    /// or its step is marked `skip_if_single_choice`. If that makes the current
    /// step skippable, the wizard moves past it.
    pub fn apply_options(
        &mut self,
        field: impl Into<FieldName>,
        result: std::result::Result<Vec<Choice>, ApiError>,
    ) -> Result<()> {
        let field = field.into();
        if self.phase == WizardPhase::Unmounted {
            debug!(field = %field, "dropping options loaded after unmount");
            return Ok(());
        }
        if !self.options.contains_key(&field) {
            return Err(WizardError::config(format!(
                "options loaded for '{field}' which declares none"
            )));
        }

        let choices = match result {
            Ok(choices) => choices,
            Err(error) => {
                warn!(field = %field, %error, "options failed to load");
                let message = error.to_string();
                self.events.push(WizardEvent::OptionsFailed {
                    field: field.clone(),
                    message: message.clone(),
                });
                self.options.insert(field, OptionsState::Failed(message));
                return Ok(());
            }
        };

        info!(field = %field, count = choices.len(), "options loaded");
        self.events.push(WizardEvent::OptionsLoaded {
            field: field.clone(),
            count: choices.len(),
        });

        if let [only] = choices.as_slice() {
            let step = self.definition.registry.step_owning(field.as_str())?;
            let single_choice_step = self.definition.registry.get(step)?.skip_if_single_choice;
            let blank = self.store.get(field.as_str()).is_none_or(|value| value.is_blank());
            if blank || single_choice_step {
                self.store.set(field.clone(), only.value.clone())?;
                self.events.push(WizardEvent::ChoiceAutoSelected { field: field.clone() });
            }
        }
        self.options.insert(field, OptionsState::Ready(choices));

        let current = self.flow.current_index();
        if self.phase == WizardPhase::Editing
            && self.is_skipped(current)
            && let Some(next) = self.flow.next_index(|idx| self.is_skipped(idx))
        {
            self.move_flow(next, true);
        }
        Ok(())
    }

    pub async fn load_options(&mut self, loader: &dyn OptionsLoader) -> Result<()> {
        for field in self.pending_option_fields() {
            let result = loader.load(&field).await;
            self.apply_options(field, result)?;
        }
        Ok(())
    }
}
