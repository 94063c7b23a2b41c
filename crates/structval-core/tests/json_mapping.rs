//! # JSON Mapping Compatibility
//!
//! Fixed vectors checking that the native JSON form, the canonical bytes,
//! and the protobuf message form agree on the same logical tree.

use serde_json::json;
use structval_core::{wire, CoreError, Kind, ListValue, Struct, StructuredValue};

/// Every kind, nested three levels deep.
fn sample() -> StructuredValue {
    StructuredValue::from(json!({
        "null": null,
        "flag": false,
        "count": 3,
        "ratio": 0.25,
        "name": "run-7",
        "outer": {"middle": {"inner": [1, "two", {"three": [true]}]}},
        "empty_list": [],
        "empty_struct": {}
    }))
}

#[test]
fn test_canonical_vector() {
    let cb = sample().to_bytes().unwrap();
    assert_eq!(
        cb.as_str(),
        r#"{"count":3,"empty_list":[],"empty_struct":{},"flag":false,"name":"run-7","null":null,"outer":{"middle":{"inner":[1,"two",{"three":[true]}]}},"ratio":0.25}"#
    );
}

#[test]
fn test_canonical_round_trip() {
    let value = sample();
    let decoded = StructuredValue::from_bytes(value.to_bytes().unwrap().as_bytes()).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn test_message_form_round_trip() {
    let value = sample();
    let message = wire::to_message_json(&value).unwrap();
    assert_eq!(wire::from_message_json(&message).unwrap(), value);
}

#[test]
fn test_message_form_matches_native_form() {
    let message = json!({"struct_value": {"fields": {
        "a": {"list_value": {"values": [{"number_value": 1}, {"null_value": "NULL_VALUE"}]}},
        "b": {"string_value": "x"}
    }}});
    let from_message = wire::from_message_json(&message).unwrap();
    let from_native: StructuredValue = r#"{"a": [1, null], "b": "x"}"#.parse().unwrap();
    assert_eq!(from_message, from_native);
}

#[test]
fn test_key_order_is_irrelevant() {
    let a: StructuredValue = r#"{"x": 1, "y": 2}"#.parse().unwrap();
    let b: StructuredValue = r#"{"y": 2, "x": 1}"#.parse().unwrap();
    assert_eq!(a, b);
    assert_eq!(a.to_bytes().unwrap(), b.to_bytes().unwrap());
}

#[test]
fn test_list_order_is_significant() {
    let a: StructuredValue = "[1, 2]".parse().unwrap();
    let b: StructuredValue = "[2, 1]".parse().unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_integers_and_floats_are_one_kind() {
    let a: StructuredValue = "1".parse().unwrap();
    let b: StructuredValue = "1.0".parse().unwrap();
    assert_eq!(a, b);
    assert_eq!(a.kind(), Kind::Number);
}

#[test]
fn test_programmatic_tree_matches_parsed_tree() {
    let mut inner = Struct::new();
    inner.insert("three", StructuredValue::from(vec![StructuredValue::Bool(true)]));
    let mut list = ListValue::new();
    list.push(1);
    list.push("two");
    list.push(inner);

    let built = StructuredValue::from(json!({"inner": [1, "two", {"three": [true]}]}));
    let mut s = Struct::new();
    s.insert("inner", list);
    assert_eq!(StructuredValue::Struct(s), built);
}

#[test]
fn test_variant_mismatch_is_an_error_not_a_panic() {
    let err = StructuredValue::from("text").as_list().unwrap_err();
    assert!(matches!(
        err,
        CoreError::VariantMismatch {
            expected: Kind::List,
            actual: Kind::String
        }
    ));
}
