//! # Error Types
//!
//! Errors raised by the structured value model. All errors use `thiserror`
//! for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Accessing the wrong variant is a programmer error and is returned as
//!   [`CoreError::VariantMismatch`]; nothing is ever coerced.
//! - Encoding and decoding failures carry the path of the offending node
//!   where one exists.
//! - Structural violations (absent struct entries) are *not* errors here.
//!   They are data, collected by the validator in `structval-validate`.

use thiserror::Error;

use crate::path::FieldPath;
use crate::value::Kind;

/// Top-level error type for the structured value model.
#[derive(Error, Debug)]
pub enum CoreError {
    /// An accessor was invoked against the wrong active variant.
    #[error("variant mismatch: expected {expected}, found {actual}")]
    VariantMismatch {
        /// The variant the accessor requires.
        expected: Kind,
        /// The variant that is actually active.
        actual: Kind,
    },

    /// Encoding a tree failed.
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// Decoding bytes or text failed.
    #[error("decoding error: {0}")]
    Decoding(#[from] DecodingError),
}

/// Error while encoding a tree to canonical bytes or message-form JSON.
#[derive(Error, Debug)]
pub enum EncodingError {
    /// A struct entry has no value. Native JSON cannot carry absent entries.
    #[error("struct entry at {path} has no value")]
    AbsentEntry {
        /// Location of the absent entry.
        path: FieldPath,
    },

    /// NaN and infinities have no JSON representation.
    #[error("number at {path} is not finite: {value}")]
    NonFiniteNumber {
        /// Location of the number.
        path: FieldPath,
        /// The offending value.
        value: f64,
    },

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error while decoding bytes, message-form JSON, or YAML into a tree.
#[derive(Error, Debug)]
pub enum DecodingError {
    /// Input is not well-formed JSON.
    #[error("malformed input: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Input is not well-formed YAML.
    #[error("malformed yaml: {0}")]
    Yaml(String),

    /// A YAML mapping key has no distinct string form.
    #[error("unsupported map key: {0}")]
    UnsupportedKey(String),

    /// A number cannot be represented in JSON.
    #[error("number at {path} is not finite")]
    NonFiniteNumber {
        /// Location of the number.
        path: FieldPath,
    },

    /// A `Value` message has none of its kind fields set, in a position
    /// where an absent value is not representable.
    #[error("value message at {path} has no kind set")]
    MissingKind {
        /// Location of the empty message.
        path: FieldPath,
    },

    /// A `Value` message has more than one kind field set.
    #[error("value message at {path} has more than one kind set")]
    MultipleKinds {
        /// Location of the ambiguous message.
        path: FieldPath,
    },

    /// A message-form node has the wrong JSON shape.
    #[error("unexpected shape at {path}: expected {expected}")]
    UnexpectedShape {
        /// Location of the node.
        path: FieldPath,
        /// Human-readable description of the expected shape.
        expected: &'static str,
    },
}
