use crate::core::FieldName;
use crate::core::value::Value;
use crate::submit::ApiError;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One selectable option of a choice field (group, subtype, gender, role...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub value: Value,
    pub label: String,
}

impl Choice {
    pub fn new(value: impl Into<Value>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OptionsState {
    Loading,
    Ready(Vec<Choice>),
    /// Blocks the wizard: a step cannot work without its options.
    Failed(String),
}

impl OptionsState {
    pub fn choices(&self) -> Option<&[Choice]> {
        match self {
            Self::Ready(choices) => Some(choices.as_slice()),
            _ => None,
        }
    }
}

#[async_trait]
pub trait OptionsLoader: Send + Sync {
    async fn load(&self, field: &FieldName) -> Result<Vec<Choice>, ApiError>;
}

/// Loader backed by choices known up front, e.g. from a YAML flow file.
#[derive(Debug, Clone, Default)]
pub struct StaticOptions {
    choices: IndexMap<FieldName, Vec<Choice>>,
}

impl StaticOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<FieldName>, choices: Vec<Choice>) -> Self {
        self.choices.insert(field.into(), choices);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }
}

#[async_trait]
impl OptionsLoader for StaticOptions {
    async fn load(&self, field: &FieldName) -> Result<Vec<Choice>, ApiError> {
        self.choices
            .get(field)
            .cloned()
            .ok_or_else(|| ApiError::Transport(format!("no options declared for '{field}'")))
    }
}
