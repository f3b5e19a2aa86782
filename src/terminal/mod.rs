//! Interactive driver: one prompt per field, one screen per step.

pub mod demo;
pub mod terminal;

pub use demo::{DemoBackend, StderrNotifier};
pub use terminal::Terminal;

use crate::core::FieldName;
use crate::core::value::Value;
use crate::error::Result;
use crate::options::{Choice, OptionsLoader};
use crate::submit::SubmissionApi;
use crate::wizard::{SubmitOutcome, Wizard};
use serde_json::Value as Json;

const BACK: &str = ":back";
const QUIT: &str = ":quit";

enum Answer {
    Kept,
    Changed,
    Back,
    Quit,
}

/// Runs `wizard` to completion. Returns the backend's answer, or `None` when
/// the user quits.
pub async fn run(
    wizard: &mut Wizard,
    api: &dyn SubmissionApi,
    loader: &dyn OptionsLoader,
    terminal: &mut Terminal,
) -> Result<Option<Json>> {
    wizard.load_options(loader).await?;
    if let Some((field, message)) = wizard.blocking_error() {
        terminal.error(&format!("Cannot start: choices for {field} are unavailable ({message})."))?;
        return Ok(None);
    }
    terminal.hint(&format!("Enter keeps the current value, {BACK} returns to the previous step, {QUIT} leaves."))?;

    'steps: loop {
        let index = wizard.current_step();
        let step = wizard.current_definition().clone();
        terminal.heading(&format!("Step {}/{}: {}", index + 1, wizard.step_count(), step.title))?;
        if let Some(message) = wizard.errors().global_message() {
            terminal.error(message)?;
        }

        for field in step.field_names() {
            match ask_field(wizard, terminal, field)? {
                Answer::Kept | Answer::Changed => {}
                Answer::Back => {
                    wizard.go_previous()?;
                    continue 'steps;
                }
                Answer::Quit => return Ok(None),
            }
        }

        if !wizard.is_last_step() {
            wizard.go_next()?;
            continue;
        }
        match wizard.submit(api).await? {
            SubmitOutcome::Succeeded(data) => {
                terminal.success("Submitted.")?;
                terminal.line(&serde_json::to_string_pretty(&data).unwrap_or_else(|_| data.to_string()))?;
                return Ok(Some(data));
            }
            SubmitOutcome::Rejected { .. } | SubmitOutcome::Invalid { .. } | SubmitOutcome::Failed { .. } => {}
            SubmitOutcome::AlreadySubmitting | SubmitOutcome::AlreadySucceeded | SubmitOutcome::Ignored => {
                return Ok(wizard.result().cloned());
            }
        }
    }
}

fn ask_field(wizard: &mut Wizard, terminal: &mut Terminal, field: &FieldName) -> Result<Answer> {
    let props = wizard.field_props(field.as_str());
    let choices: Option<Vec<Choice>> = props.choices.map(<[Choice]>::to_vec);
    let current = props.value.clone();
    let label = if props.required {
        format!("{field} *")
    } else {
        field.to_string()
    };
    if let Some(error) = props.error {
        terminal.error(&format!("  {error}"))?;
    }

    if let Some(choices) = &choices {
        for (position, choice) in choices.iter().enumerate() {
            terminal.hint(&format!("  {}) {}", position + 1, choice.label))?;
        }
    }
    let shown = describe(&current, choices.as_deref());
    let Some(input) = terminal.prompt(&label, shown.as_deref())? else {
        return Ok(Answer::Quit);
    };

    match input.trim() {
        "" => Ok(Answer::Kept),
        BACK => Ok(Answer::Back),
        QUIT => Ok(Answer::Quit),
        text => {
            wizard.on_change(field.clone(), parse_answer(text, &current, choices.as_deref()))?;
            Ok(Answer::Changed)
        }
    }
}

fn describe(value: &Value, choices: Option<&[Choice]>) -> Option<String> {
    if let Some(choice) = choices.and_then(|choices| choices.iter().find(|choice| &choice.value == value)) {
        return Some(choice.label.clone());
    }
    match value {
        Value::Bool(true) => Some("yes".to_string()),
        Value::Bool(false) => Some("no".to_string()),
        other => other.scalar_text().map(|text| text.into_owned()),
    }
}

/// Choice number or label for choice fields, yes/no for flags, text otherwise.
fn parse_answer(input: &str, current: &Value, choices: Option<&[Choice]>) -> Value {
    if let Some(choices) = choices {
        let picked = input
            .parse::<usize>()
            .ok()
            .and_then(|position| position.checked_sub(1))
            .and_then(|position| choices.get(position))
            .or_else(|| {
                choices
                    .iter()
                    .find(|choice| choice.label.eq_ignore_ascii_case(input))
            });
        if let Some(choice) = picked {
            return choice.value.clone();
        }
    }
    if matches!(current, Value::Bool(_)) {
        match input.to_ascii_lowercase().as_str() {
            "y" | "yes" | "true" | "1" => return Value::Bool(true),
            "n" | "no" | "false" | "0" => return Value::Bool(false),
            _ => {}
        }
    }
    Value::text(input)
}

#[cfg(test)]
mod tests {
    use super::{describe, parse_answer};
    use crate::core::value::Value;
    use crate::options::Choice;

    fn choices() -> Vec<Choice> {
        vec![Choice::new("F", "Woman"), Choice::new("M", "Man")]
    }

    #[test]
    fn choices_accept_number_or_label() {
        let choices = choices();
        assert_eq!(parse_answer("2", &Value::None, Some(choices.as_slice())), Value::text("M"));
        assert_eq!(parse_answer("woman", &Value::None, Some(choices.as_slice())), Value::text("F"));
        assert_eq!(parse_answer("7", &Value::None, Some(choices.as_slice())), Value::text("7"));
    }

    #[test]
    fn flags_accept_yes_and_no() {
        assert_eq!(parse_answer("yes", &Value::Bool(false), None), Value::Bool(true));
        assert_eq!(parse_answer("n", &Value::Bool(true), None), Value::Bool(false));
        assert_eq!(parse_answer("maybe", &Value::Bool(true), None), Value::text("maybe"));
    }

    #[test]
    fn current_choice_is_shown_by_label() {
        let choices = choices();
        assert_eq!(describe(&Value::text("M"), Some(choices.as_slice())).as_deref(), Some("Man"));
        assert_eq!(describe(&Value::None, None), None);
    }
}
