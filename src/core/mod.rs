pub mod value;
pub mod value_path;

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Name of a form field. Nested fields use dotted paths (`location.city`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldName(String);

impl FieldName {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// True when `self` is `other` or nested below it (`contact.email` under `contact`).
    pub fn is_within(&self, other: &str) -> bool {
        let name = self.as_str();
        name == other
            || name
                .strip_prefix(other)
                .is_some_and(|rest| rest.starts_with('.'))
    }

    /// True when the two names share a branch of the value tree.
    pub fn overlaps(&self, other: &str) -> bool {
        self.is_within(other) || FieldName::from(other).is_within(self.as_str())
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Borrow<str> for FieldName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for FieldName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<String> for FieldName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for FieldName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&String> for FieldName {
    fn from(value: &String) -> Self {
        Self(value.clone())
    }
}

impl From<&FieldName> for FieldName {
    fn from(value: &FieldName) -> Self {
        value.clone()
    }
}
