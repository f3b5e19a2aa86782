mod events;
mod navigation;
mod options_runtime;
mod submission;

pub use events::WizardEvent;
pub use navigation::StepMove;
pub use submission::{SubmissionTicket, SubmitOutcome, SubmitStart};

use crate::context::{Notifier, WizardContext};
use crate::core::FieldName;
use crate::core::value::Value;
use crate::definition::WizardDefinition;
use crate::error::{Result, WizardError};
use crate::options::{Choice, OptionsState};
use crate::state::error_map::ErrorMap;
use crate::state::flow::Flow;
use crate::state::step::{StepDefinition, StepStatus};
use crate::state::store::{FormStore, write_field};
use crate::submit::{ReverseMapping, SubmissionRunState};
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum WizardPhase {
    Editing,
    Submitting { run_id: u64 },
    Succeeded { data: serde_json::Value },
    Unmounted,
}

/// What a field component needs to render itself.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldProps<'a> {
    pub name: &'a str,
    pub value: Value,
    pub error: Option<&'a str>,
    pub disabled: bool,
    pub required: bool,
    pub choices: Option<&'a [Choice]>,
}

/// One running multi-step form: answers, position, errors and submission state.
pub struct Wizard {
    definition: WizardDefinition,
    store: FormStore,
    flow: Flow,
    runs: SubmissionRunState,
    options: IndexMap<FieldName, OptionsState>,
    reverse: ReverseMapping,
    notifier: Arc<dyn Notifier>,
    phase: WizardPhase,
    events: Vec<WizardEvent>,
}

impl Wizard {
    /// Mounts a wizard. Defaults come from the definition, then the signed-in
    /// profile, then the draft.
    pub fn new(definition: WizardDefinition, context: WizardContext) -> Result<Self> {
        let mut defaults = definition.defaults.clone();
        for (field, value) in &context.profile {
            write_field(&mut defaults, field.as_str(), value.clone())?;
        }
        if let Some(draft) = &context.draft {
            for (path, value) in draft.leaf_paths() {
                write_field(&mut defaults, &path, value.clone())?;
            }
        }
        let store = definition.new_store(defaults)?;

        let start = match &context.resume_step {
            Some(step_id) => definition
                .registry
                .position(step_id)
                .ok_or_else(|| WizardError::config(format!("cannot resume at unknown step '{step_id}'")))?,
            None => 0,
        };
        let flow = Flow::new(definition.registry.len(), start);

        let options = definition
            .option_fields
            .iter()
            .map(|field| (field.clone(), OptionsState::Loading))
            .collect();
        let reverse = definition
            .payload
            .reverse(definition.registry.field_order().chain(definition.schema.fields()));

        info!(
            wizard = %definition.name,
            steps = definition.registry.len(),
            start,
            "wizard mounted"
        );

        let mut wizard = Self {
            definition,
            store,
            flow,
            runs: SubmissionRunState::default(),
            options,
            reverse,
            notifier: context.notifier,
            phase: WizardPhase::Editing,
            events: Vec::new(),
        };
        for (field, choices) in wizard.definition.static_choices.clone() {
            wizard.apply_options(field, Ok(choices))?;
        }
        Ok(wizard)
    }

    pub fn definition(&self) -> &WizardDefinition {
        &self.definition
    }

    pub fn store(&self) -> &FormStore {
        &self.store
    }

    pub fn values(&self) -> &Value {
        self.store.values()
    }

    pub fn errors(&self) -> &ErrorMap {
        self.store.errors()
    }

    pub fn phase(&self) -> &WizardPhase {
        &self.phase
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.phase, WizardPhase::Submitting { .. })
    }

    pub fn is_mounted(&self) -> bool {
        self.phase != WizardPhase::Unmounted
    }

    pub fn current_step(&self) -> usize {
        self.flow.current_index()
    }

    pub fn current_definition(&self) -> &StepDefinition {
        &self.definition.registry.steps()[self.flow.current_index()]
    }

    pub fn step_count(&self) -> usize {
        self.definition.registry.len()
    }

    pub fn is_last_step(&self) -> bool {
        self.flow.next_index(|idx| self.is_skipped(idx)).is_none()
    }

    pub fn step_statuses(&self) -> &[StepStatus] {
        self.flow.statuses()
    }

    pub fn submission_attempts(&self) -> usize {
        self.runs.attempts()
    }

    pub fn take_events(&mut self) -> Vec<WizardEvent> {
        self.events.drain(..).collect()
    }

    pub fn field_props<'a>(&'a self, name: &'a str) -> FieldProps<'a> {
        let options = self.options.get(name);
        FieldProps {
            name,
            value: self.store.get(name).cloned().unwrap_or_default(),
            error: self.store.errors().get(name),
            disabled: !self.accepts_edits() || options.is_some_and(|state| state.choices().is_none()),
            required: self.definition.schema.is_required(name),
            choices: options.and_then(OptionsState::choices),
        }
    }

    pub fn on_change(&mut self, name: impl Into<FieldName>, value: Value) -> Result<()> {
        self.ensure_editable()?;
        let name = name.into();
        debug!(field = %name, "field changed");
        self.store.set(name, value)
    }

    pub fn merge(&mut self, partial: impl IntoIterator<Item = (FieldName, Value)>) -> Result<()> {
        self.ensure_editable()?;
        self.store.merge(partial)
    }

    pub fn reset(&mut self, keep: &[FieldName]) -> Result<()> {
        self.ensure_editable()?;
        self.store.reset(keep)?;
        self.restart_flow();
        Ok(())
    }

    /// After a successful submission: start over, keeping the flow's retained fields.
    pub fn start_another(&mut self) -> Result<()> {
        match self.phase {
            WizardPhase::Unmounted => return Err(WizardError::NotMounted),
            WizardPhase::Submitting { .. } => return Err(WizardError::SubmissionInFlight),
            _ => {}
        }
        let keep = self.definition.retain_on_restart.clone();
        self.store.reset(&keep)?;
        self.phase = WizardPhase::Editing;
        self.restart_flow();
        self.events.push(WizardEvent::Restarted);
        info!(wizard = %self.definition.name, kept = keep.len(), "wizard restarted");
        Ok(())
    }

    /// Detaches the wizard from its host. Later completions are ignored.
    pub fn unmount(&mut self) {
        if let Some(run_id) = self.runs.abandon() {
            debug!(run_id, "abandoning in-flight submission");
        }
        self.phase = WizardPhase::Unmounted;
        self.events.push(WizardEvent::Unmounted);
        info!(wizard = %self.definition.name, "wizard unmounted");
    }

    fn accepts_edits(&self) -> bool {
        self.phase == WizardPhase::Editing
    }

    fn ensure_editable(&self) -> Result<()> {
        match self.phase {
            WizardPhase::Editing => Ok(()),
            WizardPhase::Submitting { .. } => Err(WizardError::SubmissionInFlight),
            WizardPhase::Unmounted => Err(WizardError::NotMounted),
            WizardPhase::Succeeded { .. } => Err(WizardError::config(
                "the wizard has already been submitted; call start_another first",
            )),
        }
    }

    fn restart_flow(&mut self) {
        let from = self.flow.current_index();
        self.flow.restart();
        if from != 0 {
            self.events.push(WizardEvent::StepChanged { from, to: 0 });
        }
    }

    /// A step is skipped when its predicate says so, or when it only exists to
    /// pick among options that turned out to offer a single choice.
    fn is_skipped(&self, index: usize) -> bool {
        let Some(step) = self.definition.registry.steps().get(index) else {
            return true;
        };
        if step.should_skip(&self.store) {
            return true;
        }
        step.skip_if_single_choice
            && step.field_names().any(|field| self.options.contains_key(field.as_str()))
            && step
                .field_names()
                .filter_map(|field| self.options.get(field.as_str()))
                .all(|state| state.choices().is_some_and(|choices| choices.len() == 1))
    }
}

#[cfg(test)]
mod tests {
    use super::{Wizard, WizardEvent};
    use crate::context::WizardContext;
    use crate::core::FieldName;
    use crate::core::value::Value;
    use crate::definition::WizardDefinition;
    use crate::error::WizardError;
    use crate::state::step::StepDefinition;
    use crate::validation::{Rule, ValidationSchema};
    use serde_json::json;

    fn definition() -> WizardDefinition {
        WizardDefinition::builder("contact")
            .step(StepDefinition::builder("name", "Name").field("name").build())
            .step(
                StepDefinition::builder("reach", "Reach")
                    .fields(["contact.email", "contact.phone"])
                    .build(),
            )
            .schema(
                ValidationSchema::new()
                    .rule("name", Rule::required())
                    .rule("contact.email", Rule::email()),
            )
            .retain_on_restart("name")
            .build()
            .expect("definition")
    }

    #[test]
    fn profile_then_draft_seed_defaults() {
        let context = WizardContext::new()
            .with_profile_value("contact.email", "profile@x.fr")
            .with_profile_value("name", "Profile Name")
            .with_draft(Value::from(json!({ "name": "Draft Name" })));
        let wizard = Wizard::new(definition(), context).expect("wizard");

        assert_eq!(wizard.store().text("name"), Some("Draft Name"));
        assert_eq!(wizard.store().text("contact.email"), Some("profile@x.fr"));
    }

    #[test]
    fn draft_with_far_list_index_is_rejected() {
        let context = WizardContext::new().with_draft(Value::from(json!({ "tags[99999999999999]": "x" })));
        let result = Wizard::new(definition(), context);

        assert!(matches!(result, Err(WizardError::InvalidPath { .. })));
    }

    #[test]
    fn resume_at_known_step_only() {
        let wizard = Wizard::new(definition(), WizardContext::new().resume_at("reach")).expect("wizard");
        assert_eq!(wizard.current_step(), 1);

        let err = Wizard::new(definition(), WizardContext::new().resume_at("nowhere"));
        assert!(matches!(err, Err(WizardError::Config(_))));
    }

    #[test]
    fn field_props_reflect_store_and_schema() {
        let mut wizard = Wizard::new(definition(), WizardContext::new()).expect("wizard");
        wizard.on_change("name", Value::text("Jane")).expect("edit");

        let props = wizard.field_props("name");
        assert_eq!(props.value, Value::text("Jane"));
        assert!(props.required);
        assert!(!props.disabled);
        assert!(!wizard.field_props("contact.phone").required);
    }

    #[test]
    fn unmounted_wizard_refuses_edits() {
        let mut wizard = Wizard::new(definition(), WizardContext::new()).expect("wizard");
        wizard.unmount();

        assert!(!wizard.is_mounted());
        assert!(matches!(
            wizard.on_change("name", Value::text("late")),
            Err(WizardError::NotMounted)
        ));
        assert_eq!(wizard.take_events(), vec![WizardEvent::Unmounted]);
    }

    #[test]
    fn reset_returns_to_first_step() {
        let mut wizard = Wizard::new(definition(), WizardContext::new().resume_at("reach")).expect("wizard");
        wizard.on_change("name", Value::text("Jane")).expect("edit");
        wizard.on_change("contact.email", Value::text("j@x.fr")).expect("edit");

        wizard.reset(&[FieldName::from("name")]).expect("reset");

        assert_eq!(wizard.current_step(), 0);
        assert_eq!(wizard.store().text("name"), Some("Jane"));
        assert_eq!(wizard.store().get("contact.email"), None);
    }
}
