use crate::core::FieldName;
use crate::core::value::Value;
use crate::state::store::FormStore;
use crate::validation::formats;
use phonenumber::country;
use regex::Regex;

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const TOO_SHORT_MESSAGE: &str = "Must be at least {count} characters long.";
pub const TOO_LONG_MESSAGE: &str = "Must be at most {count} characters long.";
pub const EMAIL_MESSAGE: &str = "Enter a valid email address.";
pub const PHONE_MESSAGE: &str = "Enter a valid phone number.";
pub const URL_MESSAGE: &str = "Enter a valid URL.";
pub const DATE_MESSAGE: &str = "Enter a valid date.";
pub const CHOICE_MESSAGE: &str = "Select one of the available options.";
pub const AFTER_MESSAGE: &str = "The end must come after the start.";

/// One declarative constraint on a field value.
///
/// Every rule except `Presence` and non-optional `Url` treats a blank value as
/// valid, so optional fields only need format rules.
#[derive(Debug, Clone)]
pub enum Rule {
    Presence { allow_empty: bool, message: String },
    Length {
        min: Option<usize>,
        max: Option<usize>,
        too_short: String,
        too_long: String,
    },
    Email { message: String },
    Phone { region: Option<country::Id>, message: String },
    Url { optional: bool, message: String },
    Date { message: String },
    Pattern { regex: Regex, message: String },
    OneOf { choices: Vec<Value>, message: String },
}

impl Rule {
    pub fn required() -> Self {
        Self::Presence {
            allow_empty: false,
            message: REQUIRED_MESSAGE.to_string(),
        }
    }

    pub fn present() -> Self {
        Self::Presence {
            allow_empty: true,
            message: REQUIRED_MESSAGE.to_string(),
        }
    }

    pub fn length(min: Option<usize>, max: Option<usize>) -> Self {
        Self::Length {
            min,
            max,
            too_short: TOO_SHORT_MESSAGE.to_string(),
            too_long: TOO_LONG_MESSAGE.to_string(),
        }
    }

    pub fn max_length(max: usize) -> Self {
        Self::length(None, Some(max))
    }

    pub fn email() -> Self {
        Self::Email {
            message: EMAIL_MESSAGE.to_string(),
        }
    }

    pub fn phone(region: Option<country::Id>) -> Self {
        Self::Phone {
            region,
            message: PHONE_MESSAGE.to_string(),
        }
    }

    pub fn url() -> Self {
        Self::Url {
            optional: false,
            message: URL_MESSAGE.to_string(),
        }
    }

    pub fn optional_url() -> Self {
        Self::Url {
            optional: true,
            message: URL_MESSAGE.to_string(),
        }
    }

    pub fn date() -> Self {
        Self::Date {
            message: DATE_MESSAGE.to_string(),
        }
    }

    pub fn pattern(regex: Regex, message: impl Into<String>) -> Self {
        Self::Pattern {
            regex,
            message: message.into(),
        }
    }

    pub fn one_of(choices: impl IntoIterator<Item = Value>) -> Self {
        Self::OneOf {
            choices: choices.into_iter().collect(),
            message: CHOICE_MESSAGE.to_string(),
        }
    }

    /// Replaces the message. For `Length` both messages are replaced.
    pub fn with_message(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        match &mut self {
            Self::Length {
                too_short, too_long, ..
            } => {
                *too_short = text.clone();
                *too_long = text;
            }
            Self::Presence { message, .. }
            | Self::Email { message }
            | Self::Phone { message, .. }
            | Self::Url { message, .. }
            | Self::Date { message }
            | Self::Pattern { message, .. }
            | Self::OneOf { message, .. } => *message = text,
        }
        self
    }

    pub fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            Self::Presence {
                allow_empty,
                message,
            } => {
                let missing = if *allow_empty {
                    value.is_none()
                } else {
                    value.is_blank()
                };
                if missing { Err(message.clone()) } else { Ok(()) }
            }
            Self::Url { optional, message } => {
                if value.is_blank() {
                    return if *optional { Ok(()) } else { Err(message.clone()) };
                }
                match value.scalar_text() {
                    Some(text) if formats::is_url(&text) => Ok(()),
                    _ => Err(message.clone()),
                }
            }
            _ if value.is_blank() => Ok(()),
            Self::Length {
                min,
                max,
                too_short,
                too_long,
            } => {
                let count = match value {
                    Value::List(items) => items.len(),
                    other => other
                        .scalar_text()
                        .map(|text| text.chars().count())
                        .unwrap_or_default(),
                };
                if let Some(min) = min.filter(|min| count < *min) {
                    return Err(too_short.replace("{count}", &min.to_string()));
                }
                if let Some(max) = max.filter(|max| count > *max) {
                    return Err(too_long.replace("{count}", &max.to_string()));
                }
                Ok(())
            }
            Self::Email { message } => text_check(value, message, formats::is_email),
            Self::Phone { region, message } => {
                text_check(value, message, |text| formats::is_phone(text, region.clone()))
            }
            Self::Date { message } => {
                text_check(value, message, |text| formats::parse_datetime(text).is_some())
            }
            Self::Pattern { regex, message } => text_check(value, message, |text| regex.is_match(text)),
            Self::OneOf { choices, message } => {
                if choices.contains(value) {
                    Ok(())
                } else {
                    Err(message.clone())
                }
            }
        }
    }
}

fn text_check(value: &Value, message: &str, accept: impl Fn(&str) -> bool) -> Result<(), String> {
    match value.scalar_text() {
        Some(text) if accept(&text) => Ok(()),
        _ => Err(message.to_string()),
    }
}

/// Constraint spanning two fields. The error lands on the later field.
#[derive(Debug, Clone)]
pub enum CrossRule {
    After {
        earlier: FieldName,
        later: FieldName,
        allow_equal: bool,
        message: String,
    },
}

impl CrossRule {
    pub fn after(earlier: impl Into<FieldName>, later: impl Into<FieldName>) -> Self {
        Self::After {
            earlier: earlier.into(),
            later: later.into(),
            allow_equal: false,
            message: AFTER_MESSAGE.to_string(),
        }
    }

    pub fn with_message(mut self, text: impl Into<String>) -> Self {
        let Self::After { message, .. } = &mut self;
        *message = text.into();
        self
    }

    pub fn target(&self) -> &FieldName {
        match self {
            Self::After { later, .. } => later,
        }
    }

    /// Fields that only take part when both sides parse; format errors are
    /// left to the per-field rules.
    pub fn check(&self, store: &FormStore) -> Result<(), String> {
        match self {
            Self::After {
                earlier,
                later,
                allow_equal,
                message,
            } => {
                let start = store
                    .get(earlier.as_str())
                    .and_then(Value::scalar_text)
                    .and_then(|text| formats::parse_datetime(&text));
                let end = store
                    .get(later.as_str())
                    .and_then(Value::scalar_text)
                    .and_then(|text| formats::parse_datetime(&text));
                match (start, end) {
                    (Some(start), Some(end)) if end < start || (end == start && !allow_equal) => {
                        Err(message.clone())
                    }
                    _ => Ok(()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CrossRule, Rule};
    use crate::core::value::Value;
    use crate::state::store::FormStore;
    use phonenumber::country;
    use serde_json::json;

    #[test]
    fn presence_rejects_blank_unless_empty_allowed() {
        assert!(Rule::required().check(&Value::text("  ")).is_err());
        assert!(Rule::required().check(&Value::None).is_err());
        assert!(Rule::present().check(&Value::text("")).is_ok());
        assert!(Rule::present().check(&Value::None).is_err());
        assert!(Rule::required().check(&Value::List(vec![])).is_err());
    }

    #[test]
    fn length_templates_count() {
        let rule = Rule::length(Some(3), Some(5));
        assert_eq!(
            rule.check(&Value::text("ab")),
            Err("Must be at least 3 characters long.".to_string())
        );
        assert_eq!(
            rule.check(&Value::text("abcdef")),
            Err("Must be at most 5 characters long.".to_string())
        );
        assert!(rule.check(&Value::text("abcd")).is_ok());
        assert!(rule.check(&Value::text("")).is_ok());
    }

    #[test]
    fn optional_url_accepts_empty_only() {
        assert!(Rule::optional_url().check(&Value::text("")).is_ok());
        assert!(Rule::optional_url().check(&Value::text("not a url")).is_err());
        assert!(Rule::url().check(&Value::text("")).is_err());
        assert!(Rule::url().check(&Value::text("https://example.org")).is_ok());
    }

    #[test]
    fn format_rules_skip_blank_values() {
        assert!(Rule::email().check(&Value::None).is_ok());
        assert!(Rule::date().check(&Value::text("")).is_ok());
        assert!(Rule::date().check(&Value::text("someday")).is_err());
        assert!(Rule::phone(Some(country::Id::FR)).check(&Value::text("0612")).is_err());
    }

    #[test]
    fn one_of_compares_values() {
        let rule = Rule::one_of([Value::text("M"), Value::text("F"), Value::text("O")]);
        assert!(rule.check(&Value::text("F")).is_ok());
        assert!(rule.check(&Value::text("X")).is_err());
    }

    #[test]
    fn custom_message_replaces_default() {
        let rule = Rule::required().with_message("Name your event.");
        assert_eq!(rule.check(&Value::None), Err("Name your event.".to_string()));
    }

    #[test]
    fn end_must_follow_start() {
        let rule = CrossRule::after("startTime", "endTime");
        let store = FormStore::new(Value::from(json!({
            "startTime": "2026-10-19 18:00",
            "endTime": "2026-10-19 17:00"
        })));
        assert!(rule.check(&store).is_err());
        assert_eq!(rule.target().as_str(), "endTime");

        let unparsed = FormStore::new(Value::from(json!({ "startTime": "soon", "endTime": "" })));
        assert!(rule.check(&unparsed).is_ok());
    }
}
