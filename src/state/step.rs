use crate::core::FieldName;
use crate::state::store::FormStore;
use std::fmt;
use std::sync::Arc;

pub type StepPredicate = Arc<dyn Fn(&FormStore) -> bool + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Pending,
    Active,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSlot {
    Field(FieldName),
    /// Alternatives: the slot is satisfied when any member is valid.
    AnyOf(Vec<FieldName>),
}

impl FieldSlot {
    pub fn contains(&self, field: &str) -> bool {
        match self {
            Self::Field(name) => name.as_str() == field,
            Self::AnyOf(names) => names.iter().any(|name| name.as_str() == field),
        }
    }

    pub fn names(&self) -> &[FieldName] {
        match self {
            Self::Field(name) => std::slice::from_ref(name),
            Self::AnyOf(names) => names.as_slice(),
        }
    }
}

impl From<&str> for FieldSlot {
    fn from(value: &str) -> Self {
        Self::Field(FieldName::from(value))
    }
}

#[derive(Clone)]
pub struct StepDefinition {
    pub id: String,
    pub title: String,
    pub fields: Vec<FieldSlot>,
    pub is_valid: Option<StepPredicate>,
    pub invalid_message: Option<String>,
    pub skip_when: Option<StepPredicate>,
    pub skip_if_single_choice: bool,
}

impl fmt::Debug for StepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("fields", &self.fields)
            .field("is_valid", &self.is_valid.is_some())
            .field("skip_when", &self.skip_when.is_some())
            .field("skip_if_single_choice", &self.skip_if_single_choice)
            .finish()
    }
}

impl StepDefinition {
    pub fn builder(id: impl Into<String>, title: impl Into<String>) -> StepBuilder {
        StepBuilder::new(id, title)
    }

    pub fn owns(&self, field: &str) -> bool {
        self.fields.iter().any(|slot| slot.contains(field))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &FieldName> {
        self.fields.iter().flat_map(|slot| slot.names().iter())
    }

    pub fn should_skip(&self, store: &FormStore) -> bool {
        self.skip_when.as_ref().is_some_and(|skip| skip(store))
    }
}

pub struct StepBuilder {
    step: StepDefinition,
}

impl StepBuilder {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            step: StepDefinition {
                id: id.into(),
                title: title.into(),
                fields: Vec::new(),
                is_valid: None,
                invalid_message: None,
                skip_when: None,
                skip_if_single_choice: false,
            },
        }
    }

    pub fn field(mut self, name: impl Into<FieldName>) -> Self {
        self.step.fields.push(FieldSlot::Field(name.into()));
        self
    }

    pub fn fields<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<FieldName>,
    {
        self.step
            .fields
            .extend(names.into_iter().map(|name| FieldSlot::Field(name.into())));
        self
    }

    pub fn any_of<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<FieldName>,
    {
        self.step
            .fields
            .push(FieldSlot::AnyOf(names.into_iter().map(Into::into).collect()));
        self
    }

    pub fn valid_when(
        mut self,
        message: impl Into<String>,
        predicate: impl Fn(&FormStore) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.step.is_valid = Some(Arc::new(predicate));
        self.step.invalid_message = Some(message.into());
        self
    }

    pub fn skip_when(mut self, predicate: impl Fn(&FormStore) -> bool + Send + Sync + 'static) -> Self {
        self.step.skip_when = Some(Arc::new(predicate));
        self
    }

    pub fn skip_if_single_choice(mut self) -> Self {
        self.step.skip_if_single_choice = true;
        self
    }

    pub fn build(self) -> StepDefinition {
        self.step
    }
}
