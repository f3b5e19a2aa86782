use crate::core::FieldName;
use crate::core::value::Value;
use crate::error::{Result, WizardError};
use crate::options::Choice;
use crate::state::registry::StepRegistry;
use crate::state::step::StepDefinition;
use crate::state::store::{DerivedFields, FormStore, GroupMerge, parse_field, write_field};
use crate::submit::PayloadMapping;
use crate::validation::ValidationSchema;
use indexmap::IndexMap;

/// Everything that distinguishes one creation flow from another. Flows are data:
/// the wizard supplies the control flow.
#[derive(Debug, Clone)]
pub struct WizardDefinition {
    pub name: String,
    pub registry: StepRegistry,
    pub schema: ValidationSchema,
    pub payload: PayloadMapping,
    pub defaults: Value,
    pub merge_modes: IndexMap<FieldName, GroupMerge>,
    pub derived: Vec<DerivedFields>,
    pub option_fields: Vec<FieldName>,
    pub static_choices: IndexMap<FieldName, Vec<Choice>>,
    pub retain_on_restart: Vec<FieldName>,
}

impl WizardDefinition {
    pub fn builder(name: impl Into<String>) -> DefinitionBuilder {
        DefinitionBuilder::new(name)
    }

    pub fn new_store(&self, defaults: Value) -> Result<FormStore> {
        let mut store = FormStore::new(defaults);
        for (field, mode) in &self.merge_modes {
            store = store.with_merge_mode(field.clone(), *mode);
        }
        for derived in &self.derived {
            store = store.with_derived(derived.clone())?;
        }
        Ok(store)
    }
}

pub struct DefinitionBuilder {
    name: String,
    steps: Vec<StepDefinition>,
    schema: ValidationSchema,
    payload: PayloadMapping,
    defaults: Value,
    merge_modes: IndexMap<FieldName, GroupMerge>,
    derived: Vec<DerivedFields>,
    option_fields: Vec<FieldName>,
    static_choices: IndexMap<FieldName, Vec<Choice>>,
    retain_on_restart: Vec<FieldName>,
}

impl DefinitionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            schema: ValidationSchema::new(),
            payload: PayloadMapping::new(),
            defaults: Value::object(),
            merge_modes: IndexMap::new(),
            derived: Vec::new(),
            option_fields: Vec::new(),
            static_choices: IndexMap::new(),
            retain_on_restart: Vec::new(),
        }
    }

    pub fn step(mut self, step: StepDefinition) -> Self {
        self.steps.push(step);
        self
    }

    pub fn schema(mut self, schema: ValidationSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn payload(mut self, payload: PayloadMapping) -> Self {
        self.payload = payload;
        self
    }

    pub fn default_value(mut self, field: &str, value: impl Into<Value>) -> Result<Self> {
        write_field(&mut self.defaults, field, value.into())?;
        Ok(self)
    }

    pub fn defaults(mut self, defaults: Value) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn merge_mode(mut self, field: impl Into<FieldName>, mode: GroupMerge) -> Self {
        self.merge_modes.insert(field.into(), mode);
        self
    }

    pub fn derived(mut self, derived: DerivedFields) -> Self {
        self.derived.push(derived);
        self
    }

    /// Field whose choices come from the options loader.
    pub fn options_for(mut self, field: impl Into<FieldName>) -> Self {
        self.option_fields.push(field.into());
        self
    }

    pub fn choices(mut self, field: impl Into<FieldName>, choices: Vec<Choice>) -> Self {
        let field = field.into();
        self.option_fields.push(field.clone());
        self.static_choices.insert(field, choices);
        self
    }

    pub fn retain_on_restart(mut self, field: impl Into<FieldName>) -> Self {
        self.retain_on_restart.push(field.into());
        self
    }

    /// Checks that every field the schema can fail on has an owning step, and
    /// that every referenced field is a valid path.
    pub fn build(self) -> Result<WizardDefinition> {
        let registry = StepRegistry::new(self.steps)?;
        registry.check_coverage(self.schema.fields())?;
        for field in registry.field_order() {
            parse_field(field.as_str())?;
        }
        for field in self.option_fields.iter().chain(&self.retain_on_restart) {
            parse_field(field.as_str())?;
        }
        if let Some(field) = self
            .option_fields
            .iter()
            .find(|field| !registry.owns(field.as_str()))
        {
            return Err(WizardError::config(format!(
                "options declared for '{field}' which no step owns"
            )));
        }

        let definition = WizardDefinition {
            name: self.name,
            registry,
            schema: self.schema,
            payload: self.payload,
            defaults: self.defaults,
            merge_modes: self.merge_modes,
            derived: self.derived,
            option_fields: self.option_fields,
            static_choices: self.static_choices,
            retain_on_restart: self.retain_on_restart,
        };
        definition.new_store(definition.defaults.clone())?;
        Ok(definition)
    }
}

#[cfg(test)]
mod tests {
    use super::WizardDefinition;
    use crate::error::WizardError;
    use crate::state::step::StepDefinition;
    use crate::state::store::DerivedFields;
    use crate::validation::{Rule, ValidationSchema};

    #[test]
    fn schema_field_without_step_fails_loudly() {
        let result = WizardDefinition::builder("broken")
            .step(StepDefinition::builder("one", "One").field("name").build())
            .schema(ValidationSchema::new().rule("email", Rule::email()))
            .build();

        assert!(matches!(result, Err(WizardError::FieldNotOwned(field)) if field.as_str() == "email"));
    }

    #[test]
    fn options_need_an_owning_step() {
        let result = WizardDefinition::builder("broken")
            .step(StepDefinition::builder("one", "One").field("name").build())
            .options_for("gender")
            .build();

        assert!(matches!(result, Err(WizardError::Config(_))));
    }

    #[test]
    fn derived_paths_are_checked() {
        let result = WizardDefinition::builder("broken")
            .step(StepDefinition::builder("one", "One").field("group").build())
            .derived(DerivedFields::new("contact", "group").map("contact..email", "contact.email"))
            .build();

        assert!(matches!(result, Err(WizardError::InvalidPath { .. })));
    }

    #[test]
    fn defaults_accept_nested_paths() {
        let definition = WizardDefinition::builder("ok")
            .step(StepDefinition::builder("one", "One").field("location.country").build())
            .default_value("location.country", "FR")
            .expect("path")
            .build()
            .expect("definition");

        let store = definition.new_store(definition.defaults.clone()).expect("store");
        assert_eq!(store.text("location.country"), Some("FR"));
    }
}
