//! # Protobuf Message Form
//!
//! Generated REST clients for protobuf services often carry `Struct` and
//! `Value` as ordinary messages instead of using the JSON mapping:
//!
//! ```json
//! {"fields": {"lr": {"number_value": 0.01}, "tags": {"list_value": {"values": [
//!     {"string_value": "nightly"}
//! ]}}}}
//! ```
//!
//! A `Value` message sets exactly one of `null_value`, `number_value`,
//! `string_value`, `bool_value`, `struct_value`, `list_value`. A message with
//! none set is how an *absent* struct entry arrives on the wire; it decodes
//! to `None` and is left for the validator to report. Everywhere else an
//! empty `Value` is a decoding error.
//!
//! Empty `fields` / `values` are omitted on encode and accepted as missing
//! or `null` on decode. Unknown keys are ignored.

use serde_json::{Map, Value};

use crate::error::{DecodingError, EncodingError};
use crate::path::{FieldPath, Segment};
use crate::value::{ListValue, Struct, StructuredValue};

const NULL_VALUE: &str = "null_value";
const NUMBER_VALUE: &str = "number_value";
const STRING_VALUE: &str = "string_value";
const BOOL_VALUE: &str = "bool_value";
const STRUCT_VALUE: &str = "struct_value";
const LIST_VALUE: &str = "list_value";

const KIND_FIELDS: [&str; 6] = [
    NULL_VALUE,
    NUMBER_VALUE,
    STRING_VALUE,
    BOOL_VALUE,
    STRUCT_VALUE,
    LIST_VALUE,
];

/// Enum name of the only `NullValue` member.
pub const NULL_VALUE_ENUM: &str = "NULL_VALUE";

/// Encode a value as a `Value` message.
///
/// # Errors
///
/// Returns [`EncodingError::NonFiniteNumber`] for NaN or infinities.
/// Absent struct entries are encoded as empty messages and never fail.
pub fn to_message_json(value: &StructuredValue) -> Result<Value, EncodingError> {
    let mut path = FieldPath::root();
    encode_value(value, &mut path)
}

/// Decode a `Value` message.
///
/// # Errors
///
/// Returns [`DecodingError::MissingKind`] if the root message has no kind
/// set, plus any error from nested messages.
pub fn from_message_json(message: &Value) -> Result<StructuredValue, DecodingError> {
    let mut path = FieldPath::root();
    let decoded = decode_value(message, &mut path).and_then(|value| {
        value.ok_or_else(|| DecodingError::MissingKind {
            path: FieldPath::root(),
        })
    });
    decoded.map_err(log_decode_failure)
}

/// Encode an optional top-level `Struct` message. `None` encodes to `null`.
pub fn struct_to_message_json(s: Option<&Struct>) -> Result<Value, EncodingError> {
    match s {
        None => Ok(Value::Null),
        Some(s) => {
            let mut path = FieldPath::root();
            encode_struct(s, &mut path)
        }
    }
}

/// Decode an optional top-level `Struct` message. `null` decodes to `None`.
pub fn struct_from_message_json(message: &Value) -> Result<Option<Struct>, DecodingError> {
    if message.is_null() {
        return Ok(None);
    }
    let mut path = FieldPath::root();
    decode_struct(message, &mut path)
        .map(Some)
        .map_err(log_decode_failure)
}

/// Encode an optional top-level `Struct` message to JSON bytes.
pub fn struct_to_message_bytes(s: Option<&Struct>) -> Result<Vec<u8>, EncodingError> {
    let message = struct_to_message_json(s)?;
    Ok(serde_json::to_vec(&message)?)
}

/// Decode an optional top-level `Struct` message from JSON bytes.
pub fn struct_from_message_bytes(bytes: &[u8]) -> Result<Option<Struct>, DecodingError> {
    let message: Value = serde_json::from_slice(bytes).map_err(|e| {
        tracing::debug!(len = bytes.len(), error = %e, "malformed struct message");
        DecodingError::Malformed(e)
    })?;
    struct_from_message_json(&message)
}

fn log_decode_failure(e: DecodingError) -> DecodingError {
    tracing::debug!(error = %e, "failed to decode value message");
    e
}

fn single(key: &str, value: Value) -> Value {
    let mut map = Map::with_capacity(1);
    map.insert(key.to_string(), value);
    Value::Object(map)
}

fn encode_value(value: &StructuredValue, path: &mut FieldPath) -> Result<Value, EncodingError> {
    let message = match value {
        StructuredValue::Null => single(NULL_VALUE, Value::String(NULL_VALUE_ENUM.to_string())),
        StructuredValue::Bool(b) => single(BOOL_VALUE, Value::Bool(*b)),
        StructuredValue::Number(n) => {
            let number = serde_json::Number::from_f64(*n).ok_or_else(|| {
                EncodingError::NonFiniteNumber {
                    path: path.clone(),
                    value: *n,
                }
            })?;
            single(NUMBER_VALUE, Value::Number(number))
        }
        StructuredValue::String(s) => single(STRING_VALUE, Value::String(s.clone())),
        StructuredValue::List(list) => single(LIST_VALUE, encode_list(list, path)?),
        StructuredValue::Struct(s) => single(STRUCT_VALUE, encode_struct(s, path)?),
    };
    Ok(message)
}

fn encode_list(list: &ListValue, path: &mut FieldPath) -> Result<Value, EncodingError> {
    if list.is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    let mut values = Vec::with_capacity(list.len());
    for (i, item) in list.iter().enumerate() {
        path.push(Segment::Index(i));
        values.push(encode_value(item, path)?);
        path.pop();
    }
    Ok(single("values", Value::Array(values)))
}

fn encode_struct(s: &Struct, path: &mut FieldPath) -> Result<Value, EncodingError> {
    if s.is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    let mut fields = Map::new();
    for (key, entry) in s {
        path.push(Segment::Key(key.clone()));
        let message = match entry {
            Some(value) => encode_value(value, path)?,
            None => Value::Object(Map::new()),
        };
        path.pop();
        fields.insert(key.clone(), message);
    }
    Ok(single("fields", Value::Object(fields)))
}

/// Decode a `Value` message; `Ok(None)` means no kind is set.
fn decode_value(
    message: &Value,
    path: &mut FieldPath,
) -> Result<Option<StructuredValue>, DecodingError> {
    let obj = message.as_object().ok_or_else(|| DecodingError::UnexpectedShape {
        path: path.clone(),
        expected: "a Value message object",
    })?;

    // A kind field explicitly set to null is unset, except null_value where
    // null is the JSON spelling of NULL_VALUE.
    let mut set = KIND_FIELDS
        .iter()
        .filter_map(|&k| obj.get(k).map(|v| (k, v)))
        .filter(|(k, v)| *k == NULL_VALUE || !v.is_null());

    let Some((kind, payload)) = set.next() else {
        return Ok(None);
    };
    if set.next().is_some() {
        return Err(DecodingError::MultipleKinds { path: path.clone() });
    }

    let value = match kind {
        NULL_VALUE => match payload {
            Value::Null => StructuredValue::Null,
            Value::String(s) if s == NULL_VALUE_ENUM => StructuredValue::Null,
            Value::Number(n) if n.as_u64() == Some(0) => StructuredValue::Null,
            _ => return Err(shape(path, "\"NULL_VALUE\"")),
        },
        NUMBER_VALUE => match payload.as_f64() {
            Some(n) => StructuredValue::Number(n),
            None => return Err(shape(path, "a number")),
        },
        STRING_VALUE => match payload {
            Value::String(s) => StructuredValue::String(s.clone()),
            _ => return Err(shape(path, "a string")),
        },
        BOOL_VALUE => match payload {
            Value::Bool(b) => StructuredValue::Bool(*b),
            _ => return Err(shape(path, "a boolean")),
        },
        STRUCT_VALUE => StructuredValue::Struct(decode_struct(payload, path)?),
        _ => StructuredValue::List(decode_list(payload, path)?),
    };
    Ok(Some(value))
}

fn decode_struct(message: &Value, path: &mut FieldPath) -> Result<Struct, DecodingError> {
    let obj = message
        .as_object()
        .ok_or_else(|| shape(path, "a Struct message object"))?;
    let mut s = Struct::new();
    match obj.get("fields") {
        None | Some(Value::Null) => {}
        Some(Value::Object(fields)) => {
            for (key, field) in fields {
                path.push(Segment::Key(key.clone()));
                let entry = decode_value(field, path)?;
                path.pop();
                s.insert_entry(key.clone(), entry);
            }
        }
        Some(_) => return Err(shape(path, "an object for `fields`")),
    }
    Ok(s)
}

fn decode_list(message: &Value, path: &mut FieldPath) -> Result<ListValue, DecodingError> {
    let obj = message
        .as_object()
        .ok_or_else(|| shape(path, "a ListValue message object"))?;
    let mut list = ListValue::new();
    match obj.get("values") {
        None | Some(Value::Null) => {}
        Some(Value::Array(values)) => {
            for (i, item) in values.iter().enumerate() {
                path.push(Segment::Index(i));
                let value = decode_value(item, path)?
                    .ok_or_else(|| DecodingError::MissingKind { path: path.clone() })?;
                path.pop();
                list.push(value);
            }
        }
        Some(_) => return Err(shape(path, "an array for `values`")),
    }
    Ok(list)
}

fn shape(path: &FieldPath, expected: &'static str) -> DecodingError {
    DecodingError::UnexpectedShape {
        path: path.clone(),
        expected,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::testing::{arb_finite_value, arb_struct_with_absent};
    use proptest::prelude::*;

    proptest! {
        /// Message-form round trip for every encodable tree.
        #[test]
        fn message_round_trip(value in arb_finite_value()) {
            let message = to_message_json(&value).unwrap();
            prop_assert_eq!(from_message_json(&message).unwrap(), value);
        }

        /// Absent entries survive the message form, unlike native JSON.
        #[test]
        fn message_round_trip_with_absent(s in arb_struct_with_absent()) {
            let bytes = struct_to_message_bytes(Some(&s)).unwrap();
            prop_assert_eq!(struct_from_message_bytes(&bytes).unwrap(), Some(s));
        }
    }
}
