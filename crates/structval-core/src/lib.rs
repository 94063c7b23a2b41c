//! # structval-core — Structured Value Model
//!
//! A generic, recursive representation of a dynamically typed value: the
//! schema-less JSON-like tree carried by the protobuf `Struct` / `Value` /
//! `ListValue` types when arbitrary JSON is embedded in a strongly typed
//! message.
//!
//! ## Key Design Principles
//!
//! 1. **Closed union.** [`StructuredValue`] is an enum over exactly six
//!    variants. Every `match` on it is exhaustive, so recursive walks
//!    (validation, encoding) cannot silently skip a variant.
//!
//! 2. **Absent is representable.** A [`Struct`] entry is
//!    `Option<StructuredValue>`. An absent entry is a distinct state, not a
//!    sentinel inferred from a zero value.
//!
//! 3. **No coercion.** Accessors such as [`StructuredValue::as_struct`]
//!    return [`CoreError::VariantMismatch`] on the wrong variant.
//!
//! 4. **Decoding is not validation.** [`StructuredValue::from_bytes`] and
//!    the message-form decoder in [`wire`] only reject malformed input. A
//!    decoded tree may still contain absent entries; reporting them is the
//!    job of `structval-validate`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `structval-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Library code emits `tracing` events and never installs a subscriber.

pub mod canonical;
pub mod error;
pub mod path;
pub mod value;
pub mod wire;
pub mod yaml;

#[cfg(test)]
mod testing;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use error::{CoreError, DecodingError, EncodingError};
pub use path::{FieldPath, Segment};
pub use value::{Kind, ListValue, Struct, StructuredValue};
