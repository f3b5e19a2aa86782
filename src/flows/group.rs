use super::{email_rules, name_rules, phone_rules};
use crate::core::value::Value;
use crate::definition::WizardDefinition;
use crate::error::Result;
use crate::options::Choice;
use crate::state::step::StepDefinition;
use crate::state::store::GroupMerge;
use crate::submit::PayloadMapping;
use crate::validation::{Rule, ValidationSchema};

const GROUP_TYPES: [(&str, &str); 3] = [
    ("L", "Local group"),
    ("B", "Thematic group"),
    ("F", "Functional group"),
];

pub fn definition() -> Result<WizardDefinition> {
    let types: Vec<Choice> = GROUP_TYPES
        .iter()
        .map(|(value, label)| Choice::new(*value, *label))
        .collect();

    let schema = ValidationSchema::new()
        .rules(
            "type",
            [
                Rule::required(),
                Rule::one_of(GROUP_TYPES.iter().map(|(value, _)| Value::from(*value))),
            ],
        )
        .rules("name", [Rule::required(), Rule::length(Some(3), Some(100))])
        .rule("description", Rule::max_length(2000))
        .rule("website", Rule::optional_url())
        .rule("location.address1", Rule::required())
        .rule("location.zip", Rule::required())
        .rule("location.city", Rule::required())
        .rule("location.country", Rule::required())
        .rules("contact.name", name_rules())
        .rules("contact.email", email_rules())
        .rules("contact.phone", phone_rules());

    WizardDefinition::builder("group")
        .step(StepDefinition::builder("type", "Kind of group").field("type").build())
        .step(
            StepDefinition::builder("identity", "Name and purpose")
                .fields(["name", "description", "website"])
                .build(),
        )
        .step(
            StepDefinition::builder("location", "Where does it meet?")
                .fields(["location.address1", "location.zip", "location.city", "location.country"])
                .build(),
        )
        .step(
            StepDefinition::builder("contact", "Who to contact?")
                .fields(["contact.name", "contact.email", "contact.phone", "contact.hidePhone"])
                .build(),
        )
        .schema(schema)
        .payload(PayloadMapping::new().rename("type", "group_type"))
        .choices("type", types)
        .default_value("location.country", "FR")?
        .default_value("contact.hidePhone", false)?
        .merge_mode("location", GroupMerge::MergeKeys)
        .merge_mode("contact", GroupMerge::MergeKeys)
        .build()
}
