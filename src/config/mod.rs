//! YAML flow files.
//!
//! A flow file declares the same data a [`WizardDefinition`] holds: steps,
//! per-field rules, the payload table and the defaults. Loading only
//! deserializes; [`WizardConfig::compile`] turns the result into a checked
//! definition.

use crate::core::FieldName;
use crate::core::value::Value;
use crate::definition::WizardDefinition;
use crate::error::{Result, WizardError};
use crate::options::Choice;
use crate::state::step::StepDefinition;
use crate::state::store::{DerivedFields, GroupMerge};
use crate::submit::{FieldEmit, PayloadMapping};
use crate::validation::{CrossRule, Rule, ValidationSchema};
use indexmap::IndexMap;
use phonenumber::country;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WizardConfig {
    pub name: String,
    /// Default country for phone numbers written without an international prefix.
    #[serde(default)]
    pub phone_region: Option<String>,
    pub steps: Vec<StepConfig>,
    #[serde(default)]
    pub rules: IndexMap<FieldName, Vec<RuleConfig>>,
    #[serde(default)]
    pub cross: Vec<CrossRuleConfig>,
    #[serde(default)]
    pub payload: IndexMap<FieldName, FieldEmit>,
    #[serde(default)]
    pub merge: IndexMap<FieldName, GroupMerge>,
    #[serde(default)]
    pub derived: Vec<DerivedConfig>,
    #[serde(default)]
    pub defaults: Option<Value>,
    #[serde(default)]
    pub options: Vec<FieldName>,
    #[serde(default)]
    pub choices: IndexMap<FieldName, Vec<Choice>>,
    #[serde(default)]
    pub retain_on_restart: Vec<FieldName>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepConfig {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldEntry>,
    #[serde(default)]
    pub skip_if_single_choice: bool,
}

/// A plain field name, or `{ any_of: [...] }` for a group where one valid
/// member is enough. Entries keep their written order.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FieldEntry {
    Name(FieldName),
    AnyOf { any_of: Vec<FieldName> },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum RuleConfig {
    Required {
        #[serde(default)]
        allow_empty: bool,
        #[serde(default)]
        message: Option<String>,
    },
    Length {
        #[serde(default)]
        min: Option<usize>,
        #[serde(default)]
        max: Option<usize>,
        #[serde(default)]
        message: Option<String>,
    },
    Email {
        #[serde(default)]
        message: Option<String>,
    },
    Phone {
        #[serde(default)]
        region: Option<String>,
        #[serde(default)]
        message: Option<String>,
    },
    Url {
        #[serde(default)]
        optional: bool,
        #[serde(default)]
        message: Option<String>,
    },
    Date {
        #[serde(default)]
        message: Option<String>,
    },
    Pattern {
        regex: String,
        message: String,
    },
    OneOf {
        choices: Vec<Value>,
        #[serde(default)]
        message: Option<String>,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum CrossRuleConfig {
    After {
        earlier: FieldName,
        later: FieldName,
        #[serde(default)]
        allow_equal: bool,
        #[serde(default)]
        message: Option<String>,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DerivedConfig {
    pub id: String,
    pub source: FieldName,
    /// Source sub-path to target field. An empty source path copies the whole value.
    pub map: IndexMap<String, FieldName>,
}

impl WizardConfig {
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn compile(self) -> Result<WizardDefinition> {
        let default_region = self.phone_region.as_deref().map(parse_region).transpose()?;

        let mut builder = WizardDefinition::builder(self.name.clone());
        for step in self.steps {
            let title = step.title.unwrap_or_else(|| step.id.clone());
            let mut step_builder = StepDefinition::builder(step.id, title);
            for entry in step.fields {
                step_builder = match entry {
                    FieldEntry::Name(name) => step_builder.field(name),
                    FieldEntry::AnyOf { any_of } => step_builder.any_of(any_of),
                };
            }
            if step.skip_if_single_choice {
                step_builder = step_builder.skip_if_single_choice();
            }
            builder = builder.step(step_builder.build());
        }

        let mut schema = ValidationSchema::new();
        for (field, rules) in self.rules {
            let compiled = rules
                .into_iter()
                .map(|rule| rule.compile(default_region.clone()))
                .collect::<Result<Vec<_>>>()
                .map_err(|err| WizardError::config(format!("rules for '{field}': {err}")))?;
            schema = schema.rules(field, compiled);
        }
        for cross in self.cross {
            schema = schema.cross(cross.compile());
        }
        builder = builder.schema(schema);

        let mut payload = PayloadMapping::new();
        for (field, emit) in self.payload {
            payload = payload.with_override(field, emit);
        }
        builder = builder.payload(payload);

        if let Some(defaults) = self.defaults {
            if !matches!(defaults, Value::Object(_)) {
                return Err(WizardError::config("defaults must be a mapping"));
            }
            builder = builder.defaults(defaults);
        }
        for (field, mode) in self.merge {
            builder = builder.merge_mode(field, mode);
        }
        for derived in self.derived {
            let mut group = DerivedFields::new(derived.id, derived.source);
            for (from, to) in derived.map {
                group = group.map(from, to);
            }
            builder = builder.derived(group);
        }
        for field in self.options {
            builder = builder.options_for(field);
        }
        for (field, choices) in self.choices {
            builder = builder.choices(field, choices);
        }
        for field in self.retain_on_restart {
            builder = builder.retain_on_restart(field);
        }

        let definition = builder.build()?;
        debug!(wizard = %definition.name, steps = definition.registry.len(), "flow compiled");
        Ok(definition)
    }
}

impl RuleConfig {
    fn compile(self, default_region: Option<country::Id>) -> Result<Rule> {
        let (rule, message) = match self {
            Self::Required { allow_empty, message } => {
                let rule = if allow_empty { Rule::present() } else { Rule::required() };
                (rule, message)
            }
            Self::Length { min, max, message } => {
                if let (Some(min), Some(max)) = (min, max)
                    && min > max
                {
                    return Err(WizardError::config(format!("length bounds {min}..{max} are inverted")));
                }
                (Rule::length(min, max), message)
            }
            Self::Email { message } => (Rule::email(), message),
            Self::Phone { region, message } => {
                let region = match region {
                    Some(code) => Some(parse_region(&code)?),
                    None => default_region,
                };
                (Rule::phone(region), message)
            }
            Self::Url { optional, message } => {
                let rule = if optional { Rule::optional_url() } else { Rule::url() };
                (rule, message)
            }
            Self::Date { message } => (Rule::date(), message),
            Self::Pattern { regex, message } => {
                let compiled = Regex::new(&regex)
                    .map_err(|err| WizardError::config(format!("invalid pattern '{regex}': {err}")))?;
                (Rule::pattern(compiled, message), None)
            }
            Self::OneOf { choices, message } => (Rule::one_of(choices), message),
        };
        Ok(match message {
            Some(text) => rule.with_message(text),
            None => rule,
        })
    }
}

impl CrossRuleConfig {
    fn compile(self) -> CrossRule {
        match self {
            Self::After {
                earlier,
                later,
                allow_equal,
                message,
            } => {
                let mut rule = CrossRule::after(earlier, later);
                if let CrossRule::After { allow_equal: slot, .. } = &mut rule {
                    *slot = allow_equal;
                }
                match message {
                    Some(text) => rule.with_message(text),
                    None => rule,
                }
            }
        }
    }
}

fn parse_region(code: &str) -> Result<country::Id> {
    code.trim()
        .to_ascii_uppercase()
        .parse::<country::Id>()
        .map_err(|_| WizardError::config(format!("unknown phone region '{code}'")))
}

pub fn load(path: &Path) -> Result<WizardDefinition> {
    let raw = std::fs::read_to_string(path)?;
    let config = WizardConfig::from_yaml_str(&raw)?;
    debug!(path = %path.display(), "flow file read");
    config.compile()
}
