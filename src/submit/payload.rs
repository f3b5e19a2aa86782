use crate::core::FieldName;
use crate::core::value::Value;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Map;

/// How one form field appears in the backend payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "emit", rename_all = "snake_case")]
pub enum FieldEmit {
    Rename { to: String },
    /// One key of an object value, e.g. the `id` of a selected group.
    Pick { key: String, to: String },
    Skip,
}

/// Translation table between form field names and backend field names.
///
/// Fields without an override are flattened: `contact.email` is sent as
/// `contact_email`.
#[derive(Debug, Clone, Default)]
pub struct PayloadMapping {
    overrides: IndexMap<FieldName, FieldEmit>,
}

impl PayloadMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rename(mut self, field: impl Into<FieldName>, to: impl Into<String>) -> Self {
        self.overrides
            .insert(field.into(), FieldEmit::Rename { to: to.into() });
        self
    }

    pub fn pick(mut self, field: impl Into<FieldName>, key: impl Into<String>, to: impl Into<String>) -> Self {
        self.overrides.insert(
            field.into(),
            FieldEmit::Pick {
                key: key.into(),
                to: to.into(),
            },
        );
        self
    }

    pub fn skip(mut self, field: impl Into<FieldName>) -> Self {
        self.overrides.insert(field.into(), FieldEmit::Skip);
        self
    }

    pub fn with_override(mut self, field: impl Into<FieldName>, emit: FieldEmit) -> Self {
        self.overrides.insert(field.into(), emit);
        self
    }

    pub fn serialize(&self, values: &Value) -> serde_json::Value {
        let mut out = Map::new();
        if let Value::Object(map) = values {
            for (key, value) in map {
                self.emit(key.clone(), value, &mut out);
            }
        }
        serde_json::Value::Object(out)
    }

    fn emit(&self, path: String, value: &Value, out: &mut Map<String, serde_json::Value>) {
        match self.overrides.get(path.as_str()) {
            Some(FieldEmit::Skip) => {}
            Some(FieldEmit::Rename { to }) => {
                out.insert(to.clone(), value.to_json());
            }
            Some(FieldEmit::Pick { key, to }) => {
                let picked = value
                    .as_object()
                    .and_then(|map| map.get(key.as_str()))
                    .map(Value::to_json)
                    .unwrap_or(serde_json::Value::Null);
                out.insert(to.clone(), picked);
            }
            None => match value {
                Value::Object(map) if !map.is_empty() => {
                    for (key, child) in map {
                        self.emit(format!("{path}.{key}"), child, out);
                    }
                }
                other => {
                    out.insert(flatten_name(&path), other.to_json());
                }
            },
        }
    }

    pub fn backend_name(&self, field: &FieldName) -> Option<String> {
        let ancestor = self
            .overrides
            .iter()
            .filter(|(name, _)| field.is_within(name.as_str()))
            .max_by_key(|(name, _)| name.as_str().len());
        match ancestor {
            Some((_, FieldEmit::Skip)) => None,
            Some((_, FieldEmit::Rename { to } | FieldEmit::Pick { to, .. })) => Some(to.clone()),
            None => Some(flatten_name(field.as_str())),
        }
    }

    /// Reverse table for routing backend error keys back to form fields.
    pub fn reverse<'a>(&self, fields: impl IntoIterator<Item = &'a FieldName>) -> ReverseMapping {
        let mut table = IndexMap::new();
        for field in fields {
            if let Some(backend) = self.backend_name(field) {
                table.entry(backend).or_insert_with(|| field.clone());
            }
        }
        ReverseMapping { table }
    }
}

fn flatten_name(path: &str) -> String {
    path.replace('.', "_")
}

#[derive(Debug, Clone, Default)]
pub struct ReverseMapping {
    table: IndexMap<String, FieldName>,
}

impl ReverseMapping {
    /// Form field for a backend key. Unknown keys are kept verbatim so they
    /// surface instead of disappearing.
    pub fn field_for(&self, backend: &str) -> FieldName {
        self.table
            .get(backend)
            .cloned()
            .unwrap_or_else(|| FieldName::from(backend))
    }
}
