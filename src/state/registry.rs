use crate::core::FieldName;
use crate::error::{Result, WizardError};
use crate::state::error_map::{ErrorMap, is_reserved_key};
use crate::state::step::StepDefinition;
use tracing::error;

#[derive(Debug, Clone, Default)]
pub struct StepRegistry {
    steps: Vec<StepDefinition>,
}

impl StepRegistry {
    pub fn new(steps: Vec<StepDefinition>) -> Result<Self> {
        if steps.is_empty() {
            return Err(WizardError::config("a wizard needs at least one step"));
        }
        for (idx, step) in steps.iter().enumerate() {
            if steps[..idx].iter().any(|other| other.id == step.id) {
                return Err(WizardError::config(format!("duplicate step id '{}'", step.id)));
            }
        }
        Ok(Self { steps })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[StepDefinition] {
        &self.steps
    }

    pub fn get(&self, index: usize) -> Result<&StepDefinition> {
        self.steps.get(index).ok_or(WizardError::UnknownStep {
            index,
            len: self.steps.len(),
        })
    }

    pub fn position(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.id == step_id)
    }

    pub fn step_owning(&self, field: &str) -> Result<usize> {
        self.steps
            .iter()
            .position(|step| step.owns(field))
            .ok_or_else(|| {
                error!(field, "field is owned by no step");
                WizardError::FieldNotOwned(FieldName::from(field))
            })
    }

    pub fn field_order(&self) -> impl Iterator<Item = &FieldName> {
        self.steps.iter().flat_map(StepDefinition::field_names)
    }

    pub fn owns(&self, field: &str) -> bool {
        self.steps.iter().any(|step| step.owns(field))
    }

    /// First erroring field in declaration order. Errors on fields no step owns
    /// are reported instead of being skipped.
    pub fn first_error_field(&self, errors: &ErrorMap) -> Result<Option<FieldName>> {
        if let Some((unowned, _)) = errors
            .field_entries()
            .find(|(field, _)| !self.owns(field.as_str()))
        {
            error!(field = %unowned, "error reported for a field owned by no step");
            return Err(WizardError::FieldNotOwned(unowned.clone()));
        }
        Ok(self
            .field_order()
            .find(|field| errors.contains(field.as_str()))
            .cloned())
    }

    pub fn check_coverage<'a>(&self, fields: impl IntoIterator<Item = &'a FieldName>) -> Result<()> {
        for field in fields {
            if is_reserved_key(field.as_str()) {
                continue;
            }
            self.step_owning(field.as_str())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::StepRegistry;
    use crate::core::FieldName;
    use crate::error::WizardError;
    use crate::state::error_map::ErrorMap;
    use crate::state::step::StepDefinition;

    fn registry() -> StepRegistry {
        StepRegistry::new(vec![
            StepDefinition::builder("identity", "Identity").field("name").build(),
            StepDefinition::builder("contact", "Contact")
                .fields(["email", "phone"])
                .build(),
            StepDefinition::builder("voting", "Voting")
                .any_of(["votingLocation", "votingCommune"])
                .field("city")
                .build(),
        ])
        .expect("registry")
    }

    #[test]
    fn step_owning_scans_in_order() {
        let registry = registry();
        assert_eq!(registry.step_owning("name").expect("owned"), 0);
        assert_eq!(registry.step_owning("phone").expect("owned"), 1);
        assert_eq!(registry.step_owning("votingCommune").expect("owned"), 2);
    }

    #[test]
    fn unowned_field_is_a_typed_error() {
        let err = registry().step_owning("zip").expect_err("not owned");
        assert!(matches!(err, WizardError::FieldNotOwned(field) if field.as_str() == "zip"));
    }

    #[test]
    fn first_error_field_uses_declaration_order() {
        let errors: ErrorMap = [("city", "required"), ("email", "invalid")].into_iter().collect();
        let first = registry().first_error_field(&errors).expect("routable");
        assert_eq!(first, Some(FieldName::from("email")));
    }

    #[test]
    fn first_error_field_ignores_global_errors() {
        let errors = ErrorMap::global("server down");
        assert_eq!(registry().first_error_field(&errors).expect("routable"), None);
    }

    #[test]
    fn coverage_check_reports_missing_owner() {
        let fields = [FieldName::from("name"), FieldName::from("zip")];
        assert!(registry().check_coverage(fields.iter()).is_err());
    }

    #[test]
    fn duplicate_step_ids_are_rejected() {
        let steps = vec![
            StepDefinition::builder("a", "A").field("x").build(),
            StepDefinition::builder("a", "A again").field("y").build(),
        ];
        assert!(StepRegistry::new(steps).is_err());
    }
}
