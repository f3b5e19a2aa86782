use super::{email_rules, name_rules, phone_rules};
use crate::core::value::Value;
use crate::definition::WizardDefinition;
use crate::error::Result;
use crate::options::Choice;
use crate::state::step::StepDefinition;
use crate::submit::PayloadMapping;
use crate::validation::{Rule, ValidationSchema};

pub const VOTING_PLACE: [&str; 3] = ["votingLocation", "votingCommune", "votingConsulate"];

const GENDERS: [(&str, &str); 3] = [("F", "Woman"), ("M", "Man"), ("O", "Other / not specified")];

const ROLES: [(&str, &str); 3] = [
    ("president", "Polling station president"),
    ("assessor", "Assessor"),
    ("substitute", "Substitute assessor"),
];

fn choices(pairs: &[(&str, &str)]) -> Vec<Choice> {
    pairs
        .iter()
        .map(|(value, label)| Choice::new(*value, *label))
        .collect()
}

fn one_of(pairs: &[(&str, &str)]) -> Rule {
    Rule::one_of(pairs.iter().map(|(value, _)| Value::from(*value)))
}

/// Registration of a polling-station officer. The voting place is either a
/// polling station, a commune or, abroad, a consulate.
pub fn definition() -> Result<WizardDefinition> {
    let mut schema = ValidationSchema::new()
        .rules("firstName", name_rules())
        .rules("lastName", name_rules())
        .rule("birthName", Rule::max_length(255))
        .rules("gender", [Rule::required(), one_of(&GENDERS)])
        .rules("birthDate", [Rule::required(), Rule::date()])
        .rules("address", [Rule::required(), Rule::max_length(255)])
        .rule("zip", Rule::required())
        .rule("city", Rule::required())
        .rule("country", Rule::required())
        .rules("role", [Rule::required(), one_of(&ROLES)])
        .rules("email", email_rules())
        .rules("phone", phone_rules())
        .rule("remarks", Rule::max_length(2000));
    for field in VOTING_PLACE {
        schema = schema.rule(field, Rule::required());
    }

    WizardDefinition::builder("polling-station")
        .step(
            StepDefinition::builder("identity", "About you")
                .fields(["firstName", "lastName", "birthName", "gender", "birthDate"])
                .build(),
        )
        .step(
            StepDefinition::builder("address", "Your address")
                .fields(["address", "zip", "city", "country"])
                .build(),
        )
        .step(
            StepDefinition::builder("voting", "Where do you vote?")
                .any_of(VOTING_PLACE)
                .field("role")
                .build(),
        )
        .step(
            StepDefinition::builder("contact", "How to reach you")
                .fields(["email", "phone", "remarks"])
                .build(),
        )
        .schema(schema)
        .payload(
            PayloadMapping::new()
                .rename("firstName", "first_name")
                .rename("lastName", "last_name")
                .rename("birthName", "birth_name")
                .rename("birthDate", "birth_date")
                .pick("votingLocation", "id", "voting_location")
                .pick("votingCommune", "code", "voting_commune")
                .pick("votingConsulate", "id", "voting_consulate"),
        )
        .choices("gender", choices(&GENDERS))
        .choices("role", choices(&ROLES))
        .default_value("country", "FR")?
        .build()
}
