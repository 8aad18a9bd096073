//! Composition keywords and object/array directives.

use schemata_resolve::{resolve, ResolveError, ResolveOptions};
use serde_json::{json, Value};

fn schema(document: Value) -> schemata_core::Validator {
    resolve(&document, &ResolveOptions::default()).unwrap()
}

#[test]
fn test_any_of() {
    let v = schema(json!({"anyOf": [{"type": "string"}, {"type": "number"}]}));
    assert!(v.accepts(&json!("string")));
    assert!(v.accepts(&json!(10)));
    assert!(!v.accepts(&json!({})));
}

#[test]
fn test_one_of() {
    let v = schema(json!({
        "oneOf": [
            {"type": "object", "properties": {"a": {"type": "string"}}},
            {"type": "object", "properties": {"b": {"type": "number"}}}
        ]
    }));
    assert!(v.accepts(&json!({"a": "string"})));
    assert!(v.accepts(&json!({})));
    assert!(v.validate_missing().is_valid());
    assert!(v.accepts(&json!({"b": 10})));
    assert!(!v.accepts(&json!({"a": "string", "b": 10})));
    assert!(!v.accepts(&json!({"a": "string", "b": null})));
    assert!(!v.accepts(&json!({"a": null, "b": 10})));
    assert!(!v.accepts(&json!({"a": null, "b": null})));
    assert!(!v.accepts(&json!({"a": "string", "b": "string"})));
}

#[test]
fn test_one_of_overlapping_branches() {
    let v = schema(json!({"oneOf": [{"type": "number"}, {"type": "integer"}]}));
    assert!(v.accepts(&json!(1.5)));
    let result = v.validate(&json!(2));
    assert_eq!(result.violations()[0].code, "alternatives.one");
}

#[test]
fn test_not() {
    let v = schema(json!({
        "not": [
            {"type": "object", "properties": {"a": {"type": "string"}}},
            {"type": "object", "properties": {"b": {"type": "number"}}}
        ]
    }));
    assert!(!v.accepts(&json!({"a": "string"})));
    assert!(!v.accepts(&json!({})));
    assert!(!v.accepts(&json!({"b": 10})));
    assert!(v.accepts(&json!({"a": "string", "b": 10})));
    assert!(v.accepts(&json!({"a": "string", "b": null})));
    assert!(v.accepts(&json!({"a": null, "b": 10})));
    assert!(v.accepts(&json!({"a": null, "b": null})));
    assert!(v.accepts(&json!({"a": "string", "b": "string"})));
}

#[test]
fn test_composition_keywords_require_arrays() {
    for keyword in ["anyOf", "allOf", "oneOf", "not"] {
        let err = resolve(&json!({ keyword: {"type": "string"} }), &ResolveOptions::default())
            .unwrap_err();
        assert!(
            matches!(err, ResolveError::InvalidComposition { keyword: k } if k == keyword),
            "{keyword}: {err}"
        );
    }
}

#[test]
fn test_additional_properties_boolean() {
    let mut document = json!({
        "type": "object",
        "properties": {"file": {"type": "string"}}
    });
    let input = json!({"file": "data", "consumes": "application/json"});
    assert!(!schema(document.clone()).accepts(&input));

    document["additionalProperties"] = json!(false);
    assert!(!schema(document.clone()).accepts(&input));

    document["additionalProperties"] = json!(true);
    let v = schema(document);
    let result = v.validate(&input);
    assert!(result.is_valid());
    assert_eq!(result.value(), Some(&input));
    assert!(!v.accepts(&json!({"file": 5, "consumes": "application/json"})));
}

#[test]
fn test_additional_properties_false_without_properties() {
    let v = schema(json!({"type": "object", "additionalProperties": false}));
    assert!(v.accepts(&json!({})));
    assert!(!v.accepts(&json!({"a": 1})));
}

#[test]
fn test_additional_properties_fragment() {
    let v = schema(json!({
        "type": "object",
        "properties": {"file": {"type": "string"}},
        "additionalProperties": {"type": "string"}
    }));
    assert!(v.accepts(&json!({"file": "asdf", "consumes": "application/json"})));
    assert!(!v.accepts(&json!({"file": "asdf", "consumes": 5})));
    assert!(!v.accepts(&json!({"file": 5, "consumes": "application/json"})));
}

#[test]
fn test_default_values_are_metadata_only() {
    let document = json!({
        "type": "object",
        "properties": {
            "user": {"type": "string", "format": "email"},
            "locale": {"type": "string", "default": "en-US"},
            "isSubscribed": {"type": "boolean", "default": false},
            "posts": {"type": "number", "default": 0}
        },
        "required": ["user"]
    });
    let v = schema(document);
    let result = v.validate(&json!({"user": "test@domain.tld"}));
    assert!(result.is_valid());
    assert_eq!(result.value(), Some(&json!({"user": "test@domain.tld"})));
    assert_eq!(
        v.property("locale").and_then(|p| p.default_value().cloned()),
        Some(json!("en-US"))
    );
}

#[test]
fn test_array_additional_items_false() {
    let v = schema(json!({
        "type": "array",
        "items": [{"type": "string"}, {"type": "number"}],
        "additionalItems": false
    }));
    assert!(v.accepts(&json!(["test"])));
    assert!(v.accepts(&json!(["test", 123])));
    assert!(!v.accepts(&json!(["test", 123, "foo"])));
}

#[test]
fn test_all_of_simple_types() {
    let v = schema(json!({
        "allOf": [{"type": "string"}, {"type": "string", "maxLength": 3}]
    }));
    assert!(v.accepts(&json!("abc")));
    assert!(!v.accepts(&json!("abcd")));
}

#[test]
fn test_all_of_is_independent_of_branch_order() {
    let number_first = schema(json!({"allOf": [{"type": "number"}, {"type": "string"}]}));
    let string_first = schema(json!({"allOf": [{"type": "string"}, {"type": "number"}]}));
    assert!(number_first.accepts(&json!("5")));
    assert!(string_first.accepts(&json!("5")));
    assert_eq!(number_first.validate(&json!("5")).value(), Some(&json!(5)));
    assert_eq!(string_first.validate(&json!("5")).value(), Some(&json!("5")));
    assert!(!number_first.accepts(&json!(5)));
    assert!(!string_first.accepts(&json!(5)));
}

#[test]
fn test_all_of_nested_objects_accept_sibling_keys() {
    let v = schema(json!({
        "allOf": [
            {"type": "object", "properties": {"inner": {
                "type": "object", "properties": {"a": {"type": "string"}}
            }}},
            {"type": "object", "properties": {"other": {"type": "number"}}}
        ]
    }));
    assert!(v.accepts(&json!({"inner": {"a": "x", "b": 1}, "other": 1})));
}

#[test]
fn test_all_of_object() {
    let v = schema(json!({
        "allOf": [
            {"type": "object", "properties": {"a": {"type": "string"}}},
            {"type": "object", "properties": {"b": {"type": "number"}}}
        ]
    }));
    assert!(v.accepts(&json!({"a": "string", "b": 10})));
    let result = v.validate(&json!({"a": "string", "b": "string"}));
    assert!(!result.is_valid());
    assert_eq!(result.violations()[0].message, "\"b\" must be a number");
}

#[test]
fn test_all_of_array_with_conflicting_needs() {
    let v = schema(json!({
        "allOf": [
            {"type": "array", "items": [{"type": "string"}]},
            {"type": "array", "items": [{"type": "number"}]}
        ]
    }));
    assert!(!v.accepts(&json!(["string", 10])));
}

#[test]
fn test_all_of_nested() {
    let v = schema(json!({
        "title": "Organization Input",
        "allOf": [{
            "title": "Organization Common",
            "allOf": [
                {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string", "maxLength": 40},
                        "billingAddress": {"type": "string", "maxLength": 100}
                    },
                    "required": ["name"]
                },
                {
                    "type": "object",
                    "title": "Phone Number",
                    "properties": {"phoneCountryCode": {"type": "string", "minLength": 1}},
                    "required": ["phoneCountryCode"]
                }
            ]
        }]
    }));
    assert!(v.accepts(&json!({"name": "test", "phoneCountryCode": "US"})));
    assert!(!v.accepts(&json!({"name": "test"})));
    assert_eq!(v.branches().map(|b| b.len()), Some(2));
}

#[test]
fn test_type_alongside_composition() {
    let v = schema(json!({
        "type": "object",
        "properties": {"kind": {"type": "string"}},
        "additionalProperties": true,
        "anyOf": [
            {"type": "object", "properties": {"a": {"type": "number"}}, "required": ["a"]},
            {"type": "object", "properties": {"b": {"type": "number"}}, "required": ["b"]}
        ]
    }));
    assert!(v.accepts(&json!({"kind": "x", "a": 1})));
    assert!(v.accepts(&json!({"kind": "x", "b": 1})));
    assert!(!v.accepts(&json!({"kind": "x"})));
    assert!(!v.accepts(&json!({"kind": 1, "a": 1})));
}
