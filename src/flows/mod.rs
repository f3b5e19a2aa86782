//! Built-in creation flows. Each one only describes its steps, rules and
//! payload; the wizard runs them all the same way.

pub mod contact;
pub mod event;
pub mod group;
pub mod polling_station;

use crate::definition::WizardDefinition;
use crate::error::{Result, WizardError};
use crate::validation::Rule;
use phonenumber::country;

pub const NAMES: &[&str] = &["event", "group", "polling-station", "contact"];

/// Country assumed for phone numbers typed without an international prefix.
pub const DEFAULT_REGION: country::Id = country::Id::FR;

pub fn by_name(name: &str) -> Result<WizardDefinition> {
    match name {
        "event" => event::definition(),
        "group" => group::definition(),
        "polling-station" | "polling_station" => polling_station::definition(),
        "contact" => contact::definition(),
        other => Err(WizardError::config(format!(
            "unknown flow '{other}' (expected one of: {})",
            NAMES.join(", ")
        ))),
    }
}

pub(crate) fn name_rules() -> [Rule; 2] {
    [Rule::required(), Rule::max_length(255)]
}

pub(crate) fn phone_rules() -> [Rule; 2] {
    [Rule::required(), Rule::phone(Some(DEFAULT_REGION))]
}

pub(crate) fn email_rules() -> [Rule; 2] {
    [Rule::required(), Rule::email()]
}
