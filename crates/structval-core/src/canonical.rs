//! # Canonical Serialization — JCS Byte Encoding
//!
//! `StructuredValue::to_bytes()` is the byte form used by collaborators that
//! persist or transmit a tree. The output is JCS-style canonical JSON after
//! RFC 8785: sorted keys, compact separators, shortest round-trip number
//! formatting, UTF-8.
//!
//! Keys sort by UTF-8 bytes, not by UTF-16 code units as RFC 8785 requires.
//! The two orders agree except for keys that differ first at a
//! supplementary-plane character against one in U+E000..=U+FFFF, where the
//! supplementary character sorts last here.
//!
//! ## Encodability
//!
//! Two trees have no JSON representation and are rejected before any byte
//! is produced:
//!
//! 1. A struct with an absent entry ([`EncodingError::AbsentEntry`]).
//! 2. A NaN or infinite number ([`EncodingError::NonFiniteNumber`]).
//!
//! Both errors carry the path of the first offending node in sorted-key,
//! list-order traversal.
//!
//! ## Decoding
//!
//! `StructuredValue::from_bytes()` accepts any JSON text, canonical or not.
//! It fails only on malformed input. A decoded tree is not implicitly
//! validated; decoding and structural validation are separate steps.

use std::str::FromStr;

use serde_json::Value;

use crate::error::{DecodingError, EncodingError};
use crate::path::{FieldPath, Segment};
use crate::value::{ListValue, Struct, StructuredValue};

/// Bytes produced by canonical encoding of a structured value.
///
/// The inner `Vec<u8>` is private: the only constructors are
/// [`StructuredValue::to_bytes`] and [`Struct::to_bytes`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes self and returns the inner bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    /// The canonical bytes as text. Canonical output is always UTF-8.
    pub fn as_str(&self) -> &str {
        // Produced from a `String` in `encode`, so this never falls back.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl StructuredValue {
    /// Encode this tree as canonical JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError::AbsentEntry`] or
    /// [`EncodingError::NonFiniteNumber`] if the tree has no JSON
    /// representation.
    pub fn to_bytes(&self) -> Result<CanonicalBytes, EncodingError> {
        encode(&self.to_json_value()?)
    }

    /// Decode a tree from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DecodingError::Malformed`] if `bytes` is not valid JSON.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodingError> {
        serde_json::from_slice(bytes).map_err(|e| {
            tracing::debug!(len = bytes.len(), error = %e, "failed to decode structured value");
            DecodingError::Malformed(e)
        })
    }

    /// Convert to a `serde_json::Value` in the native JSON mapping.
    ///
    /// # Errors
    ///
    /// Same conditions as [`StructuredValue::to_bytes`].
    pub fn to_json_value(&self) -> Result<Value, EncodingError> {
        let mut path = FieldPath::root();
        value_to_json(self, &mut path)
    }
}

impl Struct {
    /// Encode this struct as a canonical JSON object.
    pub fn to_bytes(&self) -> Result<CanonicalBytes, EncodingError> {
        let mut path = FieldPath::root();
        encode(&struct_to_json(self, &mut path)?)
    }

    /// Decode a struct from JSON bytes. The top-level value must be an object.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodingError> {
        match StructuredValue::from_bytes(bytes)? {
            StructuredValue::Struct(s) => Ok(s),
            _ => Err(DecodingError::UnexpectedShape {
                path: FieldPath::root(),
                expected: "a JSON object",
            }),
        }
    }
}

impl FromStr for StructuredValue {
    type Err = DecodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(s.as_bytes())
    }
}

impl TryFrom<&StructuredValue> for Value {
    type Error = EncodingError;

    fn try_from(value: &StructuredValue) -> Result<Self, Self::Error> {
        value.to_json_value()
    }
}

fn encode(value: &Value) -> Result<CanonicalBytes, EncodingError> {
    let s = serde_jcs::to_string(value)?;
    Ok(CanonicalBytes(s.into_bytes()))
}

fn value_to_json(value: &StructuredValue, path: &mut FieldPath) -> Result<Value, EncodingError> {
    match value {
        StructuredValue::Null => Ok(Value::Null),
        StructuredValue::Bool(b) => Ok(Value::Bool(*b)),
        StructuredValue::Number(n) => serde_json::Number::from_f64(*n)
            .map(Value::Number)
            .ok_or_else(|| EncodingError::NonFiniteNumber {
                path: path.clone(),
                value: *n,
            }),
        StructuredValue::String(s) => Ok(Value::String(s.clone())),
        StructuredValue::List(list) => list_to_json(list, path),
        StructuredValue::Struct(s) => struct_to_json(s, path),
    }
}

fn list_to_json(list: &ListValue, path: &mut FieldPath) -> Result<Value, EncodingError> {
    let mut items = Vec::with_capacity(list.len());
    for (i, item) in list.iter().enumerate() {
        path.push(Segment::Index(i));
        items.push(value_to_json(item, path)?);
        path.pop();
    }
    Ok(Value::Array(items))
}

fn struct_to_json(s: &Struct, path: &mut FieldPath) -> Result<Value, EncodingError> {
    let mut map = serde_json::Map::new();
    for (key, entry) in s {
        path.push(Segment::Key(key.clone()));
        let value = match entry {
            Some(value) => value_to_json(value, path)?,
            None => return Err(EncodingError::AbsentEntry { path: path.clone() }),
        };
        path.pop();
        map.insert(key.clone(), value);
    }
    Ok(Value::Object(map))
}
