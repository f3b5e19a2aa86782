use serde_json::{Map, Value as Json, json};
use stepform::context::WizardContext;
use stepform::core::FieldName;
use stepform::core::value::Value;
use stepform::flows;
use stepform::state::store::FormStore;
use stepform::submit::api::structured_errors;
use stepform::validation::validate_step;
use stepform::wizard::{StepMove, Wizard};

#[test]
fn every_schema_field_routes_to_a_step() {
    for name in flows::NAMES {
        let wizard = Wizard::new(flows::by_name(name).expect("flow"), WizardContext::new()).expect("wizard");
        for field in wizard.definition().schema.fields() {
            let index = wizard
                .step_owning(field.as_str())
                .unwrap_or_else(|err| panic!("{name}: {field}: {err}"));
            assert!(index < wizard.step_count());
        }
    }
}

#[test]
fn failed_step_validation_never_advances() {
    for name in flows::NAMES {
        let definition = flows::by_name(name).expect("flow");
        for start in 0..definition.registry.len() {
            let step_id = definition.registry.get(start).expect("step").id.clone();
            let mut wizard = Wizard::new(
                flows::by_name(name).expect("flow"),
                WizardContext::new().resume_at(step_id),
            )
            .expect("wizard");

            let failing = validate_step(
                &wizard.definition().registry,
                &wizard.definition().schema,
                start,
                wizard.store(),
            )
            .expect("known step")
            .is_some();
            let outcome = wizard.go_next().expect("navigation");

            if failing {
                assert!(matches!(outcome, StepMove::Blocked(_)), "{name} step {start}");
                assert_eq!(wizard.current_step(), start, "{name} step {start}");
            }
        }
    }
}

#[test]
fn editing_a_field_clears_its_error() {
    let mut store = FormStore::new(Value::from(json!({ "contact": { "email": "x" } })));
    for field in ["name", "contact.email", "contact", "votingLocation"] {
        store.errors_mut().set(field, "previous error");
        store.set(field, Value::text("anything")).expect("set");
        assert_eq!(store.errors().get(field), None, "{field}");
    }

    store.errors_mut().set("contact.phone", "bad phone");
    store.set("contact", Value::from(json!({ "phone": "0612345678" }))).expect("set");
    assert_eq!(store.errors().get("contact.phone"), None);
}

#[test]
fn serialized_names_map_back_to_owning_steps() {
    for name in flows::NAMES {
        let definition = flows::by_name(name).expect("flow");
        let fields: Vec<FieldName> = definition.registry.field_order().cloned().collect();
        let reverse = definition.payload.reverse(fields.iter());

        let mut body = Map::new();
        let mut expected = Vec::new();
        for field in &fields {
            if let Some(backend) = definition.payload.backend_name(field) {
                body.insert(backend, json!(["invalid"]));
                expected.push(field.clone());
            }
        }
        let errors = structured_errors(&Json::Object(body), &reverse).expect("errors");

        for field in expected {
            assert!(errors.contains(field.as_str()), "{name}: {field} survives the round trip");
            assert!(definition.registry.step_owning(field.as_str()).is_ok());
        }
        assert!(definition.registry.first_error_field(&errors).expect("routable").is_some());
    }
}

#[test]
fn reset_keeps_only_the_listed_fields() {
    let definition = flows::by_name("event").expect("flow");
    let defaults = definition.defaults.clone();
    let mut wizard = Wizard::new(definition, WizardContext::new()).expect("wizard");
    let group = Value::from(json!({
        "id": "g1",
        "name": "Group",
        "contact": { "name": "Jane", "email": "g@x.com", "phone": "0612345678" },
        "location": { "name": "Hall", "address1": "1 rue Haute", "zip": "75001", "city": "Paris", "country": "FR" }
    }));

    wizard.on_change("organizerGroup", group.clone()).expect("edit");
    assert_eq!(wizard.store().text("contact.email"), Some("g@x.com"));
    wizard.on_change("name", Value::text("Rally")).expect("edit");
    wizard.on_change("location.country", Value::text("BE")).expect("edit");
    wizard.on_change("contact.email", Value::text("me@x.fr")).expect("edit");

    wizard.reset(&[FieldName::from("organizerGroup")]).expect("reset");

    assert_eq!(wizard.store().get("organizerGroup"), Some(&group));
    let mut expected = defaults;
    if let Value::Object(map) = &mut expected {
        map.insert("organizerGroup".to_string(), group);
    }
    assert_eq!(wizard.values(), &expected);
}
