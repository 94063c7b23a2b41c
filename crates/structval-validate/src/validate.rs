//! # Structural Validation
//!
//! Walks a structured value tree and collects every structural violation.
//!
//! ## Contract
//!
//! - An absent or empty struct mapping is valid.
//! - Every struct entry must be present. An absent entry is reported as
//!   [`ViolationKind::RequiredFieldMissing`] at `fields.<key>` and is not
//!   descended into.
//! - Present entries and list elements are validated recursively; their
//!   violations are tagged with the entry's `fields.<key>` or the element's
//!   `list[<index>]` path.
//! - Scalars are always valid.
//! - The walk never stops early. The caller receives the complete
//!   [`ValidationViolations`] collection, never just a boolean.
//!
//! Validation is structure-only: keys are never checked against a schema
//! and a value's kind is never checked against an expected kind.
//!
//! ## Composition
//!
//! Messages that embed a structured value validate it as one step of their
//! own pass and fold the result in with
//! [`ValidationViolations::merge_under`], so paths compose across the
//! embedding boundary (`parameters.fields.lr`).

use std::fmt;

use serde::Serialize;
use structval_core::{FieldPath, ListValue, Segment, Struct, StructuredValue};
use thiserror::Error;

use crate::config::ValidationOptions;

/// What is wrong at a violation's path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A struct entry has no value.
    RequiredFieldMissing,
    /// A non-empty container sits at [`ValidationOptions::max_depth`], so its
    /// children would sit deeper than the limit.
    DepthLimitExceeded,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::RequiredFieldMissing => f.write_str("required_field_missing"),
            ViolationKind::DepthLimitExceeded => f.write_str("depth_limit_exceeded"),
        }
    }
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Location of the violating node.
    pub path: FieldPath,
    /// Category of the violation.
    pub kind: ViolationKind,
    /// Human-readable description of the violation.
    pub message: String,
}

impl Violation {
    /// An absent struct entry at `path`.
    pub fn required_field_missing(path: FieldPath) -> Self {
        Self {
            path,
            kind: ViolationKind::RequiredFieldMissing,
            message: "value is required".to_string(),
        }
    }

    /// A non-empty container at `path` whose children would sit deeper than
    /// `max_depth`.
    pub fn depth_limit_exceeded(path: FieldPath, max_depth: usize) -> Self {
        Self {
            path,
            kind: ViolationKind::DepthLimitExceeded,
            message: format!("contents nested deeper than maximum depth of {max_depth}"),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {}: {}", self.path, self.message)
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// An empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Iterate over the violations in report order.
    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.violations.iter()
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }

    /// Number of violations of `kind`.
    pub fn count_of(&self, kind: ViolationKind) -> usize {
        self.violations.iter().filter(|v| v.kind == kind).count()
    }

    /// Add a violation.
    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Append another collection unchanged.
    pub fn extend(&mut self, other: ValidationViolations) {
        self.violations.extend(other.violations);
    }

    /// Append another collection with every path re-rooted under `prefix`.
    pub fn merge_under(&mut self, prefix: &FieldPath, other: ValidationViolations) {
        self.violations.extend(other.violations.into_iter().map(|v| Violation {
            path: v.path.prefixed(prefix),
            ..v
        }));
    }

    /// Append another collection under a named message field.
    pub fn merge_under_field(&mut self, field: &str, other: ValidationViolations) {
        let prefix = FieldPath::root().child(Segment::Field(field.to_string()));
        self.merge_under(&prefix, other);
    }

    /// `Ok(())` if empty, otherwise [`ValidationError::ValidationFailed`].
    ///
    /// `context` names what was validated, for the error message.
    pub fn into_result(self, context: impl Into<String>) -> Result<(), ValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::ValidationFailed {
                context: context.into(),
                violations: self,
            })
        }
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

impl IntoIterator for ValidationViolations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationViolations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

/// Validation failure for callers that propagate with `?`.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// One or more structural violations were found.
    #[error("validation failed for '{context}':\n{violations}")]
    ValidationFailed {
        /// What was validated.
        context: String,
        /// Every violation found.
        violations: ValidationViolations,
    },
}

/// State of one validation pass: the current path and depth, and the
/// violations found so far.
#[derive(Debug)]
pub struct Walker<'a> {
    options: &'a ValidationOptions,
    path: FieldPath,
    depth: usize,
    violations: ValidationViolations,
}

impl<'a> Walker<'a> {
    /// Start a pass at the root.
    pub fn new(options: &'a ValidationOptions) -> Self {
        Self {
            options,
            path: FieldPath::root(),
            depth: 0,
            violations: ValidationViolations::new(),
        }
    }

    /// Path of the node being validated.
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Nesting level of the node being validated. The root is 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Record a violation at the current path.
    pub fn report(&mut self, violation: Violation) {
        tracing::trace!(path = %violation.path, kind = %violation.kind, "structural violation");
        self.violations.push(violation);
    }

    /// Run `f` one level down, at `segment`.
    pub fn descend(&mut self, segment: Segment, f: impl FnOnce(&mut Self)) {
        self.path.push(segment);
        self.depth += 1;
        f(self);
        self.depth -= 1;
        self.path.pop();
    }

    /// Reports and returns true if a non-empty container here would
    /// exceed the configured depth.
    fn depth_exhausted(&mut self, is_empty: bool) -> bool {
        match self.options.max_depth {
            Some(max) if self.depth >= max && !is_empty => {
                let violation = Violation::depth_limit_exceeded(self.path.clone(), max);
                self.report(violation);
                true
            }
            _ => false,
        }
    }

    /// Finish the pass.
    pub fn finish(self) -> ValidationViolations {
        tracing::debug!(
            violations = self.violations.len(),
            max_depth = ?self.options.max_depth,
            "structured value validated"
        );
        self.violations
    }
}

/// A value that can be structurally validated.
pub trait Validate {
    /// Validate `self` at the walker's current position.
    fn validate_into(&self, walker: &mut Walker<'_>);

    /// Validate with explicit options and return every violation.
    fn validate_with(&self, options: &ValidationOptions) -> ValidationViolations {
        let mut walker = Walker::new(options);
        self.validate_into(&mut walker);
        walker.finish()
    }

    /// Validate with default options (no depth limit).
    fn validate(&self) -> ValidationViolations {
        self.validate_with(&ValidationOptions::default())
    }
}

impl Validate for StructuredValue {
    fn validate_into(&self, walker: &mut Walker<'_>) {
        match self {
            StructuredValue::Null
            | StructuredValue::Bool(_)
            | StructuredValue::Number(_)
            | StructuredValue::String(_) => {}
            StructuredValue::List(list) => list.validate_into(walker),
            StructuredValue::Struct(s) => s.validate_into(walker),
        }
    }
}

impl Validate for Struct {
    fn validate_into(&self, walker: &mut Walker<'_>) {
        if walker.depth_exhausted(self.is_empty()) {
            return;
        }
        for (key, entry) in self {
            walker.descend(Segment::Key(key.clone()), |w| match entry {
                None => {
                    let violation = Violation::required_field_missing(w.path().clone());
                    w.report(violation);
                }
                Some(value) => value.validate_into(w),
            });
        }
    }
}

impl Validate for ListValue {
    fn validate_into(&self, walker: &mut Walker<'_>) {
        if walker.depth_exhausted(self.is_empty()) {
            return;
        }
        for (i, item) in self.iter().enumerate() {
            walker.descend(Segment::Index(i), |w| item.validate_into(w));
        }
    }
}

impl<T: Validate> Validate for Option<T> {
    fn validate_into(&self, walker: &mut Walker<'_>) {
        if let Some(inner) = self {
            inner.validate_into(walker);
        }
    }
}

impl<T: Validate + ?Sized> Validate for &T {
    fn validate_into(&self, walker: &mut Walker<'_>) {
        (**self).validate_into(walker);
    }
}

/// Validate a struct mapping that may be absent.
///
/// This is the entry point for messages carrying an optional `Struct`
/// field: `None` and an empty mapping are both valid.
pub fn validate_fields(fields: Option<&Struct>) -> ValidationViolations {
    fields.validate()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Trees with every struct entry present.
    fn arb_present_value() -> impl Strategy<Value = StructuredValue> {
        let leaf = prop_oneof![
            Just(StructuredValue::Null),
            any::<bool>().prop_map(StructuredValue::Bool),
            any::<i32>().prop_map(StructuredValue::from),
            "[a-z]{0,8}".prop_map(StructuredValue::String),
        ];
        leaf.prop_recursive(5, 64, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(StructuredValue::from),
                prop::collection::btree_map("[a-z]{1,6}", inner, 0..6)
                    .prop_map(|m| StructuredValue::Struct(m.into_iter().collect())),
            ]
        })
    }

    /// Structs with some entries absent, paired with the expected count.
    fn arb_struct_with_absent() -> impl Strategy<Value = (Struct, usize)> {
        prop::collection::btree_map("[a-z]{1,6}", prop::option::of(arb_present_value()), 0..8)
            .prop_map(|m| {
                let absent = m.values().filter(|v| v.is_none()).count();
                (m.into_iter().collect(), absent)
            })
    }

    proptest! {
        /// Fully present trees are always valid.
        #[test]
        fn present_trees_are_valid(value in arb_present_value()) {
            prop_assert!(value.validate().is_empty());
        }

        /// Every absent top-level entry yields exactly one violation.
        #[test]
        fn absent_entries_counted((s, absent) in arb_struct_with_absent()) {
            let violations = s.validate();
            prop_assert_eq!(violations.len(), absent);
            prop_assert_eq!(violations.count_of(ViolationKind::RequiredFieldMissing), absent);
        }

        /// Wrapping a subtree changes paths but never the pass/fail outcome.
        #[test]
        fn wrapping_preserves_outcome((s, absent) in arb_struct_with_absent(), key in "[a-z]{1,6}") {
            let mut outer = Struct::new();
            outer.insert(key, StructuredValue::Struct(s));
            prop_assert_eq!(outer.validate().len(), absent);
        }
    }
}
