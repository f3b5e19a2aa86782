pub mod formats;
pub mod rules;

use crate::core::FieldName;
use crate::core::value::Value;
use crate::error::Result;
use crate::state::error_map::{ErrorMap, GLOBAL_KEY};
use crate::state::registry::StepRegistry;
use crate::state::step::{FieldSlot, StepDefinition};
use crate::state::store::FormStore;
use indexmap::IndexMap;

pub use rules::{CrossRule, Rule};

/// Constraint table of a wizard: per-field rules plus cross-field rules.
#[derive(Debug, Clone, Default)]
pub struct ValidationSchema {
    rules: IndexMap<FieldName, Vec<Rule>>,
    cross: Vec<CrossRule>,
}

impl ValidationSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, field: impl Into<FieldName>, rule: Rule) -> Self {
        self.rules.entry(field.into()).or_default().push(rule);
        self
    }

    pub fn rules(mut self, field: impl Into<FieldName>, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.entry(field.into()).or_default().extend(rules);
        self
    }

    pub fn cross(mut self, rule: CrossRule) -> Self {
        self.cross.push(rule);
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldName> {
        self.rules
            .keys()
            .chain(self.cross.iter().map(CrossRule::target))
    }

    pub fn is_required(&self, field: &str) -> bool {
        self.rules.get(field).is_some_and(|rules| {
            rules
                .iter()
                .any(|rule| matches!(rule, Rule::Presence { .. } | Rule::Url { optional: false, .. }))
        })
    }

    pub fn check_field(&self, field: &str, store: &FormStore) -> Option<String> {
        let rules = self.rules.get(field)?;
        let value = store.get(field).unwrap_or(&Value::None);
        rules.iter().find_map(|rule| rule.check(value).err())
    }

    fn collect_step(&self, step: &StepDefinition, store: &FormStore, errors: &mut ErrorMap) {
        for slot in &step.fields {
            match slot {
                FieldSlot::Field(name) => {
                    if let Some(message) = self.check_field(name.as_str(), store) {
                        errors.insert_first(name.clone(), message);
                    }
                }
                FieldSlot::AnyOf(names) => {
                    let failures: Vec<(&FieldName, String)> = names
                        .iter()
                        .filter_map(|name| self.check_field(name.as_str(), store).map(|msg| (name, msg)))
                        .collect();
                    if failures.len() == names.len() {
                        for (name, message) in failures {
                            errors.insert_first(name.clone(), message);
                        }
                    }
                }
            }
        }

        for rule in self.cross.iter().filter(|rule| step.owns(rule.target().as_str())) {
            if errors.contains(rule.target().as_str()) {
                continue;
            }
            if let Err(message) = rule.check(store) {
                errors.insert_first(rule.target().clone(), message);
            }
        }

        if let Some(is_valid) = &step.is_valid
            && !is_valid(store)
        {
            let message = step
                .invalid_message
                .clone()
                .unwrap_or_else(|| format!("Step '{}' is incomplete.", step.title));
            errors.insert_first(GLOBAL_KEY, message);
        }
    }
}

/// Runs only the constraints of the fields owned by step `index`.
pub fn validate_step(
    registry: &StepRegistry,
    schema: &ValidationSchema,
    index: usize,
    store: &FormStore,
) -> Result<Option<ErrorMap>> {
    let step = registry.get(index)?;
    let mut errors = ErrorMap::new();
    schema.collect_step(step, store, &mut errors);
    Ok(errors.into_option())
}

/// Runs every constraint of every step; the guard before submitting.
pub fn validate_all(
    registry: &StepRegistry,
    schema: &ValidationSchema,
    store: &FormStore,
) -> Option<ErrorMap> {
    let mut errors = ErrorMap::new();
    for step in registry.steps() {
        schema.collect_step(step, store, &mut errors);
    }
    errors.into_option()
}
