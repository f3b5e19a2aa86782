use super::{DEFAULT_REGION, name_rules};
use crate::definition::WizardDefinition;
use crate::error::Result;
use crate::state::step::StepDefinition;
use crate::submit::PayloadMapping;
use crate::validation::{Rule, ValidationSchema};

pub const CONSENT_MESSAGE: &str = "The person must agree to be contacted before they can be added.";

/// A contact collected by a group organizer: reachable by email or by phone.
pub fn definition() -> Result<WizardDefinition> {
    let schema = ValidationSchema::new()
        .rules("firstName", name_rules())
        .rules("lastName", name_rules())
        .rule("zip", Rule::required())
        .rules("email", [Rule::required(), Rule::email()])
        .rules("phone", [Rule::required(), Rule::phone(Some(DEFAULT_REGION))]);

    WizardDefinition::builder("contact")
        .step(
            StepDefinition::builder("identity", "Who is it?")
                .fields(["firstName", "lastName", "zip"])
                .build(),
        )
        .step(
            StepDefinition::builder("reach", "How to reach them")
                .any_of(["email", "phone"])
                .build(),
        )
        .step(
            StepDefinition::builder("group", "Follow a group")
                .field("group")
                .skip_if_single_choice()
                .build(),
        )
        .step(
            StepDefinition::builder("consent", "Consent")
                .fields(["newsletters", "consent"])
                .valid_when(CONSENT_MESSAGE, |store| {
                    store.get("consent").and_then(|value| value.as_bool()) == Some(true)
                })
                .build(),
        )
        .schema(schema)
        .payload(
            PayloadMapping::new()
                .rename("firstName", "first_name")
                .rename("lastName", "last_name")
                .pick("group", "id", "group")
                .rename("consent", "has_consent"),
        )
        .default_value("newsletters", false)?
        .default_value("consent", false)?
        .options_for("group")
        .retain_on_restart("group")
        .build()
}

#[cfg(test)]
mod tests {
    use super::{CONSENT_MESSAGE, definition};
    use crate::context::WizardContext;
    use crate::core::value::Value;
    use crate::options::Choice;
    use crate::wizard::{StepMove, Wizard};
    use serde_json::json;

    fn wizard() -> Wizard {
        let mut wizard = Wizard::new(definition().expect("flow"), WizardContext::new()).expect("wizard");
        wizard
            .apply_options(
                "group",
                Ok(vec![Choice::new(Value::from(json!({ "id": "g1" })), "Paris 11")]),
            )
            .expect("declared");
        wizard
    }

    #[test]
    fn phone_alone_is_enough_to_reach() {
        let mut wizard = wizard();
        wizard.go_to(1).expect("jump");
        wizard.on_change("phone", Value::text("+33 6 12 34 56 78")).expect("edit");

        assert!(matches!(wizard.go_next().expect("navigation"), StepMove::Moved { from: 1, to: 3 }));
    }

    #[test]
    fn single_group_is_preselected() {
        let wizard = wizard();
        assert_eq!(
            wizard.store().get("group"),
            Some(&Value::from(json!({ "id": "g1" })))
        );
    }

    #[test]
    fn consent_gates_the_last_step() {
        let mut wizard = wizard();
        wizard.go_to(3).expect("jump");

        assert!(matches!(wizard.go_next().expect("navigation"), StepMove::Blocked(_)));
        assert_eq!(wizard.errors().global_message(), Some(CONSENT_MESSAGE));

        wizard.on_change("consent", Value::Bool(true)).expect("edit");
        assert_eq!(wizard.go_next().expect("navigation"), StepMove::Stayed);
        assert!(wizard.errors().global_message().is_none());
    }
}
