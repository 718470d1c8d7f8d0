//! Property-based tests for verity-validator.

use proptest::prelude::*;
use serde_json::{Value, json};
use verity_validator::message::{self, sentence_case};
use verity_validator::prelude::*;

fn signup() -> Record {
    Record::new().with_validation(
        Validation::from_json(&json!({
            "name": {"required": true, "maxLength": 12},
            "age": {"required": false, "range": [18, 99]},
            "email": {"required": false, "pattern": "email"},
        }))
        .unwrap(),
    )
}

fn controller(record: Record) -> Controller<Record> {
    let options = Options::new().label_formatter(LabelFormatter::None).silent(true);
    bind(&View::new().with_model(record), options)
        .unwrap()
        .controller()
        .unwrap()
        .clone()
}

fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-200i64..200).prop_map(Value::from),
        "[a-z0-9@. ]{0,20}".prop_map(Value::from),
    ]
}

// ============================================================================
// PRE-VALIDATION
// ============================================================================

proptest! {
    #[test]
    fn pre_validate_is_deterministic(attr in "name|age|email|other", value in arb_value()) {
        let ctl = controller(signup());
        let first = ctl.pre_validate(&attr, &value).unwrap();
        let second = ctl.pre_validate(&attr, &value).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn pre_validate_leaves_stored_validity_alone(value in arb_value()) {
        let ctl = controller(signup());
        ctl.is_valid(true).unwrap();
        let before = ctl.is_valid(ValidityQuery::Stored).unwrap();
        ctl.pre_validate("name", &value).unwrap();
        prop_assert_eq!(ctl.is_valid(ValidityQuery::Stored).unwrap(), before);
    }

    #[test]
    fn undeclared_attributes_are_always_valid(attr in "[a-z]{1,8}", value in arb_value()) {
        prop_assume!(!matches!(attr.as_str(), "name" | "age" | "email"));
        let ctl = controller(signup());
        prop_assert_eq!(ctl.pre_validate(&attr, &value).unwrap(), None);
    }
}

// ============================================================================
// VALIDITY QUERIES
// ============================================================================

proptest! {
    #[test]
    fn list_query_is_conjunction_of_single_queries(
        name in arb_value(),
        age in arb_value(),
        email in arb_value(),
    ) {
        let record = signup();
        record.set("name", name);
        record.set("age", age);
        record.set("email", email);
        let ctl = controller(record);

        let each = ["name", "age", "email"]
            .iter()
            .map(|attr| ctl.is_valid(*attr).unwrap())
            .all(|valid| valid);
        prop_assert_eq!(ctl.is_valid(["name", "age", "email"]).unwrap(), each);
        prop_assert_eq!(ctl.is_valid(ValidityQuery::Declared).unwrap(), each);
    }

    #[test]
    fn revalidation_agrees_with_declared_query(name in arb_value(), age in arb_value()) {
        let record = signup();
        record.set("name", name);
        record.set("age", age);
        let ctl = controller(record);

        let declared = ctl.is_valid(false).unwrap();
        prop_assert_eq!(ctl.is_valid(true).unwrap(), declared);
        prop_assert_eq!(ctl.is_valid(ValidityQuery::Stored).unwrap(), declared);
    }
}

// ============================================================================
// MESSAGES
// ============================================================================

proptest! {
    #[test]
    fn sentence_case_never_panics(attr in "\\PC{0,24}") {
        let _ = sentence_case(&attr);
    }

    #[test]
    fn format_without_placeholders_is_identity(template in "[^{}]{0,40}") {
        prop_assert_eq!(message::format::<&str>(&template, &[]), template);
    }

    #[test]
    fn format_fills_known_indices(arg in "[a-z]{0,10}") {
        prop_assert_eq!(message::format("<{0}>", &[arg.as_str()]), format!("<{arg}>"));
    }
}
