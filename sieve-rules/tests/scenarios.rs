//! Rule chains driven through a full validation pass.

use serde_json::json;
use sieve_core::{Map, MessageCatalog, RuleTree, Translator, Validator, Value, params};
use sieve_rules as v;

fn json_params(value: serde_json::Value) -> Map {
    match Value::from(value) {
        Value::Map(map) => map,
        other => panic!("expected an object, got {:?}", other),
    }
}

#[test]
fn test_length_within_bounds() {
    let mut validator = Validator::new(
        RuleTree::new().rule("username", v::alnum().no_whitespace().length_between(1, 15)),
    );
    let errors = validator
        .validate(&params! { "username" => "davidepastore" })
        .unwrap();

    assert!(errors.is_empty());
    assert!(!validator.has_errors());
}

#[test]
fn test_length_out_of_bounds() {
    let mut validator = Validator::new(
        RuleTree::new().rule("username", v::alnum().no_whitespace().length_between(1, 5)),
    );
    validator
        .validate(&params! { "username" => "davidepastore" })
        .unwrap();

    assert!(validator.has_errors());
    assert_eq!(
        validator.errors().to_json(),
        json!({ "username": ["\"davidepastore\" must have a length between 1 and 5"] })
    );
}

#[test]
fn test_several_fields() {
    let rules = RuleTree::new()
        .rule("username", v::alnum().no_whitespace().length_between(1, 15))
        .rule("age", v::numeric_val().positive().between(1, 60));
    let mut validator = Validator::new(rules);
    validator
        .validate(&params! { "username" => "davidepastore", "age" => "89" })
        .unwrap();

    assert_eq!(
        validator.errors().to_json(),
        json!({ "age": ["\"89\" must be less than or equal to 60"] })
    );
}

#[test]
fn test_nested_rule_ignores_stray_fields() {
    let rules = RuleTree::new().tree(
        "email",
        RuleTree::new().tree(
            "sub",
            RuleTree::new().tree(
                "sub-sub",
                RuleTree::new().rule("finally", v::numeric_val().between(1, 200)),
            ),
        ),
    );
    let values = json_params(json!({
        "finally": 22,
        "email": {
            "finally": 33,
            "sub": {
                "finally": 97,
                "sub-sub": { "finally": 321 }
            }
        }
    }));

    let mut validator = Validator::new(rules);
    validator.validate(&values).unwrap();

    assert_eq!(
        validator.errors().to_json(),
        json!({ "email.sub.sub-sub.finally": ["321 must be less than or equal to 200"] })
    );
}

#[test]
fn test_nested_named_rules_on_scalar_container() {
    let notification = RuleTree::new()
        .rule("title", v::string_type().length(Some(1), None).set_name("notificationTitle"))
        .rule("body", v::string_type().length(Some(1), None).set_name("notificationBody"))
        .rule(
            "actionName",
            v::optional(v::string_type().length(Some(1), None)).set_name("notificationAction"),
        );
    let rules = RuleTree::new().tree("message", RuleTree::new().tree("notification", notification));
    let values = json_params(json!({ "message": { "notification": 1 } }));

    let mut validator = Validator::new(rules);
    validator.validate(&values).unwrap();

    assert_eq!(
        validator.errors().to_json(),
        json!({
            "message.notification.title": [
                "notificationTitle must be a string",
                "notificationTitle must have a length greater than 1"
            ],
            "message.notification.body": [
                "notificationBody must be a string",
                "notificationBody must have a length greater than 1"
            ]
        })
    );
}

#[test]
fn test_absent_optional_passes() {
    let mut validator = Validator::new(RuleTree::new().rule("notExisting", v::optional(v::alpha())));
    validator.validate(&params! { "username" => "Josh" }).unwrap();
    assert!(!validator.has_errors());
}

#[test]
fn test_absent_required_fails() {
    let mut validator = Validator::new(RuleTree::new().rule("notExisting", v::alpha()));
    validator.validate(&params! { "username" => "Josh" }).unwrap();
    assert_eq!(
        validator.errors().to_json(),
        json!({ "notExisting": ["null must contain only letters (a-z)"] })
    );
}

#[test]
fn test_catalog_translation_and_replacement() {
    let rules = || RuleTree::new().rule("username", v::length(Some(1), Some(5)));
    let values = params! { "username" => "davidepastore" };

    let catalog = MessageCatalog::new().with(
        v::message::LENGTH_BETWEEN,
        "{{name}} deve avere una dimensione di caratteri compresa tra {{minValue}} e {{maxValue}}",
    );
    let mut validator = Validator::new(rules()).with_translator(Translator::from_catalog(catalog));
    validator.validate(&values).unwrap();
    assert_eq!(
        validator.errors().get("username"),
        Some(
            &["\"davidepastore\" deve avere una dimensione di caratteri compresa tra 1 e 5"
                .to_string()][..]
        )
    );

    let renewed = MessageCatalog::new().with(
        v::message::LENGTH_BETWEEN,
        "{{name}} deve avere una dimensione di caratteri compresa tra {{minValue}} e {{maxValue}} (nuovo)",
    );
    validator.set_translator(Translator::from_catalog(renewed));
    validator.validate(&values).unwrap();
    assert_eq!(
        validator.errors().get("username"),
        Some(
            &["\"davidepastore\" deve avere una dimensione di caratteri compresa tra 1 e 5 (nuovo)"
                .to_string()][..]
        )
    );
}

#[test]
fn test_untranslated_templates_fall_back() {
    let catalog = MessageCatalog::new().with("{{name}} must be numeric", "{{name}} deve essere numerico");
    let rules = RuleTree::new()
        .rule("age", v::numeric_val())
        .rule("name", v::alpha());
    let mut validator = Validator::new(rules).with_translator(Translator::from_catalog(catalog));
    validator
        .validate(&params! { "age" => "old", "name" => "R2D2" })
        .unwrap();

    assert_eq!(
        validator.errors().to_json(),
        json!({
            "age": ["\"old\" deve essere numerico"],
            "name": ["\"R2D2\" must contain only letters (a-z)"]
        })
    );
}

#[test]
fn test_rule_fault_aborts_pass() {
    let rules = RuleTree::new()
        .rule("username", v::alpha())
        .rule("inverted", v::length(Some(5), Some(1)));
    let mut validator = Validator::new(rules);
    let err = validator.validate(&params! { "username" => "1" }).unwrap_err();

    assert_eq!(err.path(), "inverted");
    assert!(validator.errors().is_empty());
}
