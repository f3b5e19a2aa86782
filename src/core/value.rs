use crate::core::value_path::{PathSegment, ValuePath, ValuePathParseError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Number(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
    Object(IndexMap<String, Value>),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn object() -> Self {
        Self::Object(IndexMap::new())
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::Text(v) => v.is_empty(),
            Self::List(v) => v.is_empty(),
            Self::Object(v) => v.is_empty(),
            _ => false,
        }
    }

    /// Empty, or text made only of whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(v) => v.trim().is_empty(),
            other => other.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Object(v) => Some(v),
            _ => None,
        }
    }

    pub fn scalar_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Text(v) => Some(Cow::Borrowed(v.as_str())),
            Self::Number(v) => Some(Cow::Owned(v.to_string())),
            Self::Float(v) => Some(Cow::Owned(v.to_string())),
            Self::Bool(v) => Some(Cow::Owned(v.to_string())),
            _ => None,
        }
    }

    pub fn get_path(&self, path: &ValuePath) -> Option<&Value> {
        let mut current = self;
        for segment in path.segments() {
            current = match (segment, current) {
                (PathSegment::Key(key), Self::Object(map)) => map.get(key.as_str())?,
                (PathSegment::Index(index), Self::List(list)) => list.get(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Writes `value` at `path`, creating intermediate objects and lists.
    /// A list index may address an existing item or append one past the end.
    pub fn set_path(&mut self, path: &ValuePath, value: Value) -> Result<(), ValuePathParseError> {
        *self.ensure_path_mut(path)? = value;
        Ok(())
    }

    fn ensure_path_mut(&mut self, path: &ValuePath) -> Result<&mut Value, ValuePathParseError> {
        let mut current = self;
        for segment in path.segments() {
            current = match segment {
                PathSegment::Key(key) => {
                    if !matches!(current, Self::Object(_)) {
                        *current = Self::object();
                    }
                    let Self::Object(map) = current else {
                        unreachable!("value was just replaced by an object");
                    };
                    map.entry(key.clone()).or_default()
                }
                PathSegment::Index(index) => {
                    if !matches!(current, Self::List(_)) {
                        *current = Self::List(Vec::new());
                    }
                    let Self::List(list) = current else {
                        unreachable!("value was just replaced by a list");
                    };
                    if *index > list.len() {
                        return Err(ValuePathParseError::new(format!(
                            "index {index} is past the end of a list of {} items",
                            list.len()
                        )));
                    }
                    if *index == list.len() {
                        list.push(Value::None);
                    }
                    &mut list[*index]
                }
            };
        }
        Ok(current)
    }

    /// Dotted paths of every non-object leaf, in insertion order.
    pub fn leaf_paths(&self) -> Vec<(String, &Value)> {
        let mut out = Vec::new();
        collect_leaves(self, String::new(), &mut out);
        out
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::None => serde_json::Value::Null,
            Self::Bool(v) => serde_json::Value::Bool(*v),
            Self::Number(v) => serde_json::Value::from(*v),
            Self::Float(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::Text(v) => serde_json::Value::String(v.clone()),
            Self::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Self::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

fn collect_leaves<'a>(value: &'a Value, prefix: String, out: &mut Vec<(String, &'a Value)>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                collect_leaves(child, path, out);
            }
        }
        _ if prefix.is_empty() => {}
        other => out.push((prefix, other)),
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::None,
            serde_json::Value::Bool(v) => Self::Bool(v),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(v) => Self::Number(v),
                None => Self::Float(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(v) => Self::Text(v),
            serde_json::Value::Array(items) => Self::List(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}
