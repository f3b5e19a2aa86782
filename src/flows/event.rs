use super::{email_rules, name_rules, phone_rules};
use crate::definition::WizardDefinition;
use crate::error::Result;
use crate::state::step::StepDefinition;
use crate::state::store::{DerivedFields, GroupMerge};
use crate::submit::PayloadMapping;
use crate::validation::{CrossRule, Rule, ValidationSchema};

pub const CONTACT_GROUP: &str = "contact";
pub const LOCATION_GROUP: &str = "location";

/// Event creation. Contact and location start from the organizing group's
/// own details until the user changes them.
pub fn definition() -> Result<WizardDefinition> {
    let steps = [
        StepDefinition::builder("organizer", "Organizer")
            .field("organizerGroup")
            .skip_if_single_choice()
            .build(),
        StepDefinition::builder("details", "What is it?")
            .fields(["name", "subtype", "description"])
            .build(),
        StepDefinition::builder("schedule", "When?")
            .fields(["startTime", "endTime"])
            .build(),
        StepDefinition::builder("location", "Where?")
            .fields([
                "location.name",
                "location.address1",
                "location.zip",
                "location.city",
                "location.country",
            ])
            .build(),
        StepDefinition::builder("contact", "Who to contact?")
            .fields(["contact.name", "contact.email", "contact.phone", "contact.hidePhone"])
            .build(),
    ];

    let schema = ValidationSchema::new()
        .rule("organizerGroup", Rule::required())
        .rules("name", [Rule::required(), Rule::length(Some(3), Some(100))])
        .rule("subtype", Rule::required())
        .rule("description", Rule::max_length(2000))
        .rules("startTime", [Rule::required(), Rule::date()])
        .rules("endTime", [Rule::required(), Rule::date()])
        .cross(CrossRule::after("startTime", "endTime").with_message("The event must end after it starts."))
        .rules("location.name", name_rules())
        .rule("location.address1", Rule::required())
        .rule("location.zip", Rule::required())
        .rule("location.city", Rule::required())
        .rule("location.country", Rule::required())
        .rules("contact.name", name_rules())
        .rules("contact.email", email_rules())
        .rules("contact.phone", phone_rules());

    let payload = PayloadMapping::new()
        .pick("organizerGroup", "id", "organizer_group")
        .rename("startTime", "start_time")
        .rename("endTime", "end_time")
        .rename("contact.hidePhone", "contact_hide_phone");

    let mut builder = WizardDefinition::builder("event");
    for step in steps {
        builder = builder.step(step);
    }
    builder
        .schema(schema)
        .payload(payload)
        .default_value("location.country", "FR")?
        .default_value("contact.hidePhone", false)?
        .merge_mode(LOCATION_GROUP, GroupMerge::MergeKeys)
        .merge_mode(CONTACT_GROUP, GroupMerge::MergeKeys)
        .derived(
            DerivedFields::new(CONTACT_GROUP, "organizerGroup")
                .map("contact.name", "contact.name")
                .map("contact.email", "contact.email")
                .map("contact.phone", "contact.phone"),
        )
        .derived(DerivedFields::new(LOCATION_GROUP, "organizerGroup").map("location", LOCATION_GROUP))
        .options_for("organizerGroup")
        .options_for("subtype")
        .retain_on_restart("organizerGroup")
        .build()
}

#[cfg(test)]
mod tests {
    use super::definition;
    use crate::context::WizardContext;
    use crate::core::value::Value;
    use crate::options::Choice;
    use crate::wizard::{StepMove, Wizard};
    use serde_json::json;

    fn group(id: &str, email: &str) -> Choice {
        Choice::new(
            Value::from(json!({
                "id": id,
                "name": format!("Group {id}"),
                "contact": { "name": "Organizers", "email": email, "phone": "+33612345678" },
                "location": { "name": "Town hall", "address1": "1 place de la Mairie", "zip": "75001", "city": "Paris" }
            })),
            format!("Group {id}"),
        )
    }

    #[test]
    fn group_details_fill_contact_and_location() {
        let mut wizard = Wizard::new(definition().expect("flow"), WizardContext::new()).expect("wizard");
        wizard
            .apply_options("organizerGroup", Ok(vec![group("g1", "g1@x.fr"), group("g2", "g2@x.fr")]))
            .expect("declared");

        wizard
            .on_change("organizerGroup", group("g1", "g1@x.fr").value)
            .expect("edit");

        assert_eq!(wizard.store().text("contact.email"), Some("g1@x.fr"));
        assert_eq!(wizard.store().text("location.city"), Some("Paris"));
        assert_eq!(wizard.store().text("location.country"), Some("FR"));
    }

    #[test]
    fn end_before_start_is_reported_on_end_time() {
        let mut wizard = Wizard::new(
            definition().expect("flow"),
            WizardContext::new().resume_at("schedule"),
        )
        .expect("wizard");
        wizard.on_change("startTime", Value::text("2026-05-01 18:00")).expect("edit");
        wizard.on_change("endTime", Value::text("2026-05-01 17:00")).expect("edit");

        assert!(matches!(wizard.go_next().expect("navigation"), StepMove::Blocked(_)));
        assert_eq!(wizard.errors().get("endTime"), Some("The event must end after it starts."));
        assert!(!wizard.errors().contains("startTime"));
    }

    #[test]
    fn payload_sends_group_id() {
        let definition = definition().expect("flow");
        let values = Value::from(json!({
            "organizerGroup": { "id": "g1", "name": "Group g1" },
            "contact": { "email": "a@b.fr" }
        }));
        let payload = definition.payload.serialize(&values);

        assert_eq!(payload["organizer_group"], json!("g1"));
        assert_eq!(payload["contact_email"], json!("a@b.fr"));
    }
}
