use super::{Wizard, WizardEvent, WizardPhase};
use crate::error::{Result, WizardError};
use crate::state::error_map::{ErrorMap, GLOBAL_KEY};
use crate::validation::validate_step;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum StepMove {
    Moved { from: usize, to: usize },
    /// Nothing to move to (first/last step, or already there).
    Stayed,
    /// The current step did not validate; its errors are now in the store.
    Blocked(ErrorMap),
    Busy,
}

impl Wizard {
    /// Validates the current step and advances to the next step that is not skipped.
    pub fn go_next(&mut self) -> Result<StepMove> {
        if let Some(busy) = self.navigation_guard()? {
            return Ok(busy);
        }
        let current = self.flow.current_index();
        if let Some(errors) = self.check_step(current)? {
            return Ok(StepMove::Blocked(errors));
        }

        let Some(next) = self.flow.next_index(|idx| self.is_skipped(idx)) else {
            self.flow.complete_current();
            return Ok(StepMove::Stayed);
        };
        Ok(self.move_flow(next, true))
    }

    /// Steps back without validating. Errors recorded on the step being left stay.
    pub fn go_previous(&mut self) -> Result<StepMove> {
        if let Some(busy) = self.navigation_guard()? {
            return Ok(busy);
        }
        match self.flow.previous_index(|idx| self.is_skipped(idx)) {
            Some(previous) => Ok(self.move_flow(previous, false)),
            None => Ok(StepMove::Stayed),
        }
    }

    /// Unconditional jump, as used by "edit this step" links.
    pub fn go_to(&mut self, index: usize) -> Result<StepMove> {
        if let Some(busy) = self.navigation_guard()? {
            return Ok(busy);
        }
        let len = self.definition.registry.len();
        if index >= len {
            return Err(WizardError::UnknownStep { index, len });
        }
        Ok(self.move_flow(index, false))
    }

    pub fn step_owning(&self, field: &str) -> Result<usize> {
        self.definition.registry.step_owning(field)
    }

    pub fn go_to_step_owning(&mut self, field: &str) -> Result<usize> {
        let index = self.step_owning(field)?;
        self.go_to(index)?;
        Ok(index)
    }

    /// Validates step `index`, replacing the errors of its fields (and the
    /// global message) with the fresh result.
    pub(super) fn check_step(&mut self, index: usize) -> Result<Option<ErrorMap>> {
        let result = validate_step(&self.definition.registry, &self.definition.schema, index, &self.store)?;
        let step = self.definition.registry.get(index)?;
        let errors = self.store.errors_mut();
        for field in step.field_names() {
            errors.clear_within(field.as_str());
        }
        errors.clear_global();

        if let Some(found) = &result {
            errors.extend(found.clone());
            debug!(step = index, fields = found.len(), "step blocked by validation");
            self.events.push(WizardEvent::ValidationFailed {
                step: index,
                fields: found.len(),
            });
        }
        Ok(result)
    }

    /// Sends the user to the earliest step that owns one of `errors`' fields.
    /// Global-only maps leave the position unchanged.
    pub(super) fn route_to_first_error(&mut self, errors: &ErrorMap) -> Result<Option<usize>> {
        let Some(field) = self.definition.registry.first_error_field(errors)? else {
            return Ok(None);
        };
        let index = self.definition.registry.step_owning(field.as_str())?;
        self.move_flow(index, false);
        Ok(Some(index))
    }

    pub(super) fn move_flow(&mut self, to: usize, completed: bool) -> StepMove {
        let from = self.flow.current_index();
        if !self.flow.move_to(to, completed) {
            return StepMove::Stayed;
        }
        debug!(from, to, "step changed");
        self.events.push(WizardEvent::StepChanged { from, to });
        StepMove::Moved { from, to }
    }

    fn navigation_guard(&self) -> Result<Option<StepMove>> {
        match self.phase {
            WizardPhase::Unmounted => Err(WizardError::NotMounted),
            WizardPhase::Submitting { .. } => Ok(Some(StepMove::Busy)),
            WizardPhase::Editing | WizardPhase::Succeeded { .. } => Ok(None),
        }
    }
}

pub(super) fn is_global_only(errors: &ErrorMap) -> bool {
    errors.field_entries().next().is_none() && errors.contains(GLOBAL_KEY)
}

#[cfg(test)]
mod tests {
    use super::StepMove;
    use crate::context::WizardContext;
    use crate::core::value::Value;
    use crate::definition::WizardDefinition;
    use crate::error::WizardError;
    use crate::state::step::{StepDefinition, StepStatus};
    use crate::validation::{Rule, ValidationSchema};
    use crate::wizard::{Wizard, WizardEvent};

    fn wizard() -> Wizard {
        let definition = WizardDefinition::builder("three")
            .step(StepDefinition::builder("name", "Name").field("name").build())
            .step(
                StepDefinition::builder("reach", "Reach")
                    .fields(["email", "phone"])
                    .skip_when(|store| store.text("name") == Some("skip"))
                    .build(),
            )
            .step(StepDefinition::builder("city", "City").field("city").build())
            .schema(
                ValidationSchema::new()
                    .rule("name", Rule::required())
                    .rule("email", Rule::email())
                    .rule("city", Rule::required()),
            )
            .build()
            .expect("definition");
        Wizard::new(definition, WizardContext::new()).expect("wizard")
    }

    #[test]
    fn blank_required_field_blocks_advance() {
        let mut wizard = wizard();
        wizard.on_change("name", Value::text("")).expect("edit");

        let outcome = wizard.go_next().expect("navigation");

        assert!(matches!(outcome, StepMove::Blocked(ref errors) if errors.contains("name")));
        assert_eq!(wizard.current_step(), 0);
        assert_eq!(wizard.errors().get("name"), Some("This field is required."));
    }

    #[test]
    fn valid_step_advances_and_marks_done() {
        let mut wizard = wizard();
        wizard.on_change("name", Value::text("Jane")).expect("edit");

        assert_eq!(wizard.go_next().expect("navigation"), StepMove::Moved { from: 0, to: 1 });
        assert_eq!(wizard.step_statuses()[0], StepStatus::Done);
        assert_eq!(wizard.step_statuses()[1], StepStatus::Active);
        assert_eq!(
            wizard.take_events(),
            vec![WizardEvent::StepChanged { from: 0, to: 1 }]
        );
    }

    #[test]
    fn skipped_steps_are_passed_over_both_ways() {
        let mut wizard = wizard();
        wizard.on_change("name", Value::text("skip")).expect("edit");

        assert_eq!(wizard.go_next().expect("navigation"), StepMove::Moved { from: 0, to: 2 });
        assert_eq!(wizard.go_previous().expect("navigation"), StepMove::Moved { from: 2, to: 0 });
    }

    #[test]
    fn last_step_clamps() {
        let mut wizard = wizard();
        wizard.go_to(2).expect("jump");
        wizard.on_change("city", Value::text("Paris")).expect("edit");

        assert_eq!(wizard.go_next().expect("navigation"), StepMove::Stayed);
        assert_eq!(wizard.current_step(), 2);
        assert!(wizard.is_last_step());
    }

    #[test]
    fn going_back_keeps_recorded_errors() {
        let mut wizard = wizard();
        wizard.go_to(1).expect("jump");
        wizard.on_change("email", Value::text("nope")).expect("edit");
        assert!(matches!(wizard.go_next().expect("navigation"), StepMove::Blocked(_)));

        wizard.go_previous().expect("navigation");
        assert_eq!(wizard.current_step(), 0);
        assert!(wizard.errors().contains("email"));
    }

    #[test]
    fn jumps_are_bounds_checked() {
        let mut wizard = wizard();
        assert!(matches!(
            wizard.go_to(9),
            Err(WizardError::UnknownStep { index: 9, len: 3 })
        ));
        assert_eq!(wizard.go_to_step_owning("phone").expect("owned"), 1);
        assert!(matches!(
            wizard.go_to_step_owning("nickname"),
            Err(WizardError::FieldNotOwned(_))
        ));
    }
}
