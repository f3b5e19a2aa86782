use crate::core::FieldName;
use crate::core::value::Value;
use crate::core::value_path::ValuePath;
use crate::error::{Result, WizardError};
use crate::state::error_map::ErrorMap;
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

/// How an object value written to a field group is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupMerge {
    /// The whole object replaces the group.
    #[default]
    Replace,
    /// Each key of the incoming object is written on its own.
    MergeKeys,
}

/// Fields auto-filled from another field until the user edits one of them.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedFields {
    id: String,
    source: FieldName,
    mappings: Vec<(String, FieldName)>,
    is_default: bool,
}

impl DerivedFields {
    pub fn new(id: impl Into<String>, source: impl Into<FieldName>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            mappings: Vec::new(),
            is_default: true,
        }
    }

    /// Copies `from` (a path inside the source value, empty for the whole value) into `to`.
    pub fn map(mut self, from: impl Into<String>, to: impl Into<FieldName>) -> Self {
        self.mappings.push((from.into(), to.into()));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &FieldName {
        &self.source
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    fn targets(&self) -> impl Iterator<Item = &FieldName> {
        self.mappings.iter().map(|(_, target)| target)
    }
}

pub(crate) fn parse_field(field: &str) -> Result<ValuePath> {
    ValuePath::parse(field).map_err(|err| WizardError::InvalidPath {
        path: field.to_string(),
        reason: err.to_string(),
    })
}

pub(crate) fn write_field(target: &mut Value, field: &str, value: Value) -> Result<()> {
    let path = parse_field(field)?;
    target.set_path(&path, value).map_err(|err| WizardError::InvalidPath {
        path: field.to_string(),
        reason: err.to_string(),
    })
}

#[derive(Debug, Clone)]
pub struct FormStore {
    defaults: Value,
    values: Value,
    errors: ErrorMap,
    merge_modes: IndexMap<FieldName, GroupMerge>,
    derived: Vec<DerivedFields>,
}

impl FormStore {
    pub fn new(defaults: Value) -> Self {
        let defaults = match defaults {
            Value::Object(_) => defaults,
            _ => Value::object(),
        };
        Self {
            values: defaults.clone(),
            defaults,
            errors: ErrorMap::new(),
            merge_modes: IndexMap::new(),
            derived: Vec::new(),
        }
    }

    pub fn with_merge_mode(mut self, field: impl Into<FieldName>, mode: GroupMerge) -> Self {
        self.merge_modes.insert(field.into(), mode);
        self
    }

    pub fn with_derived(mut self, derived: DerivedFields) -> Result<Self> {
        parse_field(derived.source.as_str())?;
        for (from, to) in &derived.mappings {
            if !from.is_empty() {
                parse_field(from)?;
            }
            parse_field(to.as_str())?;
        }
        self.derived.push(derived);
        Ok(self)
    }

    pub fn values(&self) -> &Value {
        &self.values
    }

    pub fn defaults(&self) -> &Value {
        &self.defaults
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        let path = ValuePath::parse(field).ok()?;
        self.values.get_path(&path)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_text)
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn errors_mut(&mut self) -> &mut ErrorMap {
        &mut self.errors
    }

    pub fn derived(&self, id: &str) -> Option<&DerivedFields> {
        self.derived.iter().find(|group| group.id == id)
    }

    /// User edit of one field. Clears its errors, marks derived groups it
    /// belongs to as manually edited and refreshes groups sourced from it.
    pub fn set(&mut self, field: impl Into<FieldName>, value: Value) -> Result<()> {
        let field = field.into();
        self.write(&field, value)?;
        self.mark_manual(&field);
        self.apply_derivations(&field)
    }

    pub fn merge<I, F>(&mut self, partial: I) -> Result<()>
    where
        I: IntoIterator<Item = (F, Value)>,
        F: Into<FieldName>,
    {
        for (field, value) in partial {
            self.set(field, value)?;
        }
        Ok(())
    }

    pub fn reset(&mut self, keep: &[FieldName]) -> Result<()> {
        let kept: Vec<(FieldName, Value)> = keep
            .iter()
            .filter_map(|field| self.get(field.as_str()).map(|value| (field.clone(), value.clone())))
            .collect();

        self.values = self.defaults.clone();
        self.errors.clear();
        for group in &mut self.derived {
            group.is_default = true;
        }
        for (field, value) in kept {
            write_field(&mut self.values, field.as_str(), value)?;
        }
        debug!(kept = keep.len(), "form state reset");
        Ok(())
    }

    fn write(&mut self, field: &FieldName, value: Value) -> Result<()> {
        parse_field(field.as_str())?;
        let mode = self.merge_modes.get(field).copied().unwrap_or_default();
        match (mode, value) {
            (GroupMerge::MergeKeys, Value::Object(incoming)) => {
                for (key, child_value) in incoming {
                    let child = FieldName::from(format!("{field}.{key}"));
                    write_field(&mut self.values, child.as_str(), child_value)?;
                    self.errors.clear_within(child.as_str());
                }
                self.errors.remove(field.as_str());
            }
            (_, value) => {
                write_field(&mut self.values, field.as_str(), value)?;
                self.errors.clear_within(field.as_str());
            }
        }
        debug!(field = %field, "field written");
        Ok(())
    }

    fn mark_manual(&mut self, field: &FieldName) {
        for group in &mut self.derived {
            if group.is_default && group.targets().any(|target| target.overlaps(field.as_str())) {
                debug!(group = %group.id, field = %field, "derived group edited manually");
                group.is_default = false;
            }
        }
    }

    fn apply_derivations(&mut self, field: &FieldName) -> Result<()> {
        let mut writes = Vec::<(FieldName, Value)>::new();
        for group in &self.derived {
            if !group.is_default || !group.source.overlaps(field.as_str()) {
                continue;
            }
            let Some(source_value) = self.get(group.source.as_str()) else {
                continue;
            };
            for (from, to) in &group.mappings {
                let derived = if from.is_empty() {
                    Some(source_value)
                } else {
                    source_value.get_path(&parse_field(from)?)
                };
                if let Some(derived) = derived {
                    writes.push((to.clone(), derived.clone()));
                }
            }
        }
        for (target, value) in writes {
            self.write(&target, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{DerivedFields, FormStore, GroupMerge};
    use crate::core::FieldName;
    use crate::core::value::Value;
    use serde_json::json;

    fn store() -> FormStore {
        FormStore::new(Value::from(json!({
            "organizerGroup": null,
            "name": "",
            "contact": { "name": "", "email": "", "phone": "" }
        })))
    }

    #[test]
    fn set_clears_error_for_field_and_children() {
        let mut store = store();
        store.errors_mut().set("name", "required");
        store.errors_mut().set("contact.email", "invalid");

        store.set("name", Value::text("Jane")).expect("set");
        store.set("contact", Value::from(json!({ "email": "a@b.fr" }))).expect("set");

        assert!(store.errors().is_empty());
        assert_eq!(store.text("name"), Some("Jane"));
    }

    #[test]
    fn replace_mode_drops_missing_group_keys() {
        let mut store = store();
        store.set("contact", Value::from(json!({ "email": "a@b.fr" }))).expect("set");
        assert_eq!(store.get("contact.phone"), None);
    }

    #[test]
    fn merge_keys_mode_keeps_other_group_keys() {
        let mut store = store().with_merge_mode("contact", GroupMerge::MergeKeys);
        store.set("contact.phone", Value::text("0601020304")).expect("set");
        store.set("contact", Value::from(json!({ "email": "a@b.fr" }))).expect("set");

        assert_eq!(store.text("contact.phone"), Some("0601020304"));
        assert_eq!(store.text("contact.email"), Some("a@b.fr"));
    }

    #[test]
    fn derived_group_fills_until_manual_edit() {
        let mut store = store()
            .with_derived(DerivedFields::new("contact", "organizerGroup").map("contact.email", "contact.email"))
            .expect("derived");

        store
            .set("organizerGroup", Value::from(json!({ "id": 1, "contact": { "email": "g@x.com" } })))
            .expect("set");
        assert_eq!(store.text("contact.email"), Some("g@x.com"));

        store.set("contact.email", Value::text("me@x.com")).expect("set");
        assert_eq!(store.derived("contact").map(DerivedFields::is_default), Some(false));

        store
            .set("organizerGroup", Value::from(json!({ "id": 2, "contact": { "email": "other@x.com" } })))
            .expect("set");
        assert_eq!(store.text("contact.email"), Some("me@x.com"));
    }

    #[test]
    fn reset_keeps_listed_fields_and_restores_defaults() {
        let mut store = store();
        store.set("organizerGroup", Value::from(json!({ "id": 7 }))).expect("set");
        store.set("name", Value::text("Meeting")).expect("set");
        store.set("contact.email", Value::text("me@x.com")).expect("set");
        store.errors_mut().set("name", "taken");

        store.reset(&[FieldName::from("organizerGroup")]).expect("reset");

        assert_eq!(store.get("organizerGroup"), Some(&Value::from(json!({ "id": 7 }))));
        assert_eq!(store.text("name"), Some(""));
        assert_eq!(store.text("contact.email"), Some(""));
        assert!(store.errors().is_empty());
    }

    #[test]
    fn reset_leaves_derived_targets_at_defaults() {
        let mut store = store()
            .with_derived(DerivedFields::new("contact", "organizerGroup").map("contact.email", "contact.email"))
            .expect("derived");
        store
            .set("organizerGroup", Value::from(json!({ "contact": { "email": "g@x.com" } })))
            .expect("set");
        store.set("contact.email", Value::text("me@x.com")).expect("set");

        store.reset(&[FieldName::from("organizerGroup")]).expect("reset");

        assert_eq!(store.text("contact.email"), Some(""));
        assert_eq!(store.get("contact"), store.defaults().as_object().and_then(|map| map.get("contact")));
        assert_eq!(store.derived("contact").map(DerivedFields::is_default), Some(true));

        store
            .set("organizerGroup", Value::from(json!({ "contact": { "email": "h@x.com" } })))
            .expect("set");
        assert_eq!(store.text("contact.email"), Some("h@x.com"));
    }

    #[test]
    fn invalid_path_is_reported() {
        let mut store = store();
        assert!(store.set("contact..email", Value::text("x")).is_err());
    }
}
