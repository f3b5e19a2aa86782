use crate::core::FieldName;
use indexmap::IndexMap;
use serde::Serialize;

/// Key for failures that belong to no particular field.
pub const GLOBAL_KEY: &str = "global";
/// Alternative reserved key used by some backends for the same purpose.
pub const DETAIL_KEY: &str = "detail";

pub fn is_reserved_key(key: &str) -> bool {
    key == GLOBAL_KEY || key == DETAIL_KEY
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ErrorMap {
    entries: IndexMap<FieldName, String>,
}

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global(message: impl Into<String>) -> Self {
        let mut map = Self::new();
        map.set(GLOBAL_KEY, message);
        map
    }

    pub fn insert_first(&mut self, field: impl Into<FieldName>, message: impl Into<String>) {
        self.entries.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn set(&mut self, field: impl Into<FieldName>, message: impl Into<String>) {
        self.entries.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.entries.contains_key(field)
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.entries.shift_remove(field)
    }

    /// Drops entries for `field` and everything nested below it.
    pub fn clear_within(&mut self, field: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.is_within(field));
        before - self.entries.len()
    }

    pub fn clear_global(&mut self) {
        self.entries.shift_remove(GLOBAL_KEY);
        self.entries.shift_remove(DETAIL_KEY);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Message under `global`, falling back to `detail`.
    pub fn global_message(&self) -> Option<&str> {
        self.get(GLOBAL_KEY).or_else(|| self.get(DETAIL_KEY))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &str)> {
        self.entries.iter().map(|(key, msg)| (key, msg.as_str()))
    }

    pub fn field_entries(&self) -> impl Iterator<Item = (&FieldName, &str)> {
        self.iter().filter(|(key, _)| !is_reserved_key(key.as_str()))
    }

    pub fn extend(&mut self, other: ErrorMap) {
        for (key, message) in other.entries {
            self.entries.insert(key, message);
        }
    }

    pub fn into_option(self) -> Option<Self> {
        (!self.is_empty()).then_some(self)
    }
}

impl<K: Into<FieldName>, V: Into<String>> FromIterator<(K, V)> for ErrorMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (key, message) in iter {
            map.set(key, message);
        }
        map
    }
}
