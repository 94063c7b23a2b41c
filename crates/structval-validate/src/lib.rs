//! # structval-validate — Structural Validation
//!
//! Recursive validation of structured value trees from `structval-core`.
//!
//! ## Validation (`validate`)
//!
//! The [`validate`] module walks a tree and confirms that every struct entry
//! is present and that nested values are themselves valid. It aggregates
//! every violation into a [`ValidationViolations`] collection, each tagged
//! with a `fields.<key>` / `list[<index>]` path. Key entry points:
//!
//! - [`Validate::validate`]: on any `StructuredValue`, `Struct`, or `ListValue`.
//! - [`validate_fields`]: on an optional struct mapping.
//! - [`ValidationViolations::merge_under_field`]: folds a nested result into
//!   an embedding message's own report.
//!
//! ## Options (`config`)
//!
//! The [`config`] module holds [`ValidationOptions`], including the optional
//! caller-imposed depth limit, loadable from YAML or JSON.
//!
//! ## Crate Policy
//!
//! - Depends only on `structval-core` internally.
//! - Validation failures are data. Only config loading returns `Err`.

pub mod config;
pub mod validate;

pub use config::{ConfigError, ValidationOptions};
pub use validate::{
    validate_fields, Validate, ValidationError, ValidationViolations, Violation, ViolationKind,
    Walker,
};
