//! # Structured Value — Closed Recursive Union
//!
//! [`StructuredValue`] is one node of a schema-less JSON-like tree. It is a
//! closed enum over six variants; two of them ([`ListValue`] and [`Struct`])
//! hold further values, so the type is recursive.
//!
//! ## Absent Entries
//!
//! A [`Struct`] maps keys to *entries*, and an entry is
//! `Option<StructuredValue>`. `None` is an absent value: it cannot come from
//! native JSON, but it can come from the protobuf message form (a `Value`
//! message with no kind set) or from a caller assembling a tree by hand. The
//! validator reports every absent entry; the canonical encoder refuses them.
//!
//! ## Native JSON Mapping
//!
//! `Serialize` / `Deserialize` follow the JSON mapping of the protobuf
//! `google.protobuf.Value` type: structs are objects, lists are arrays,
//! scalars are JSON literals. All numbers are `f64`.

use std::collections::{btree_map, BTreeMap};
use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Error as _, Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::error::CoreError;

/// Discriminant of a [`StructuredValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    /// `null`.
    Null,
    /// `true` / `false`.
    Bool,
    /// Double-precision number.
    Number,
    /// UTF-8 text.
    String,
    /// Ordered sequence of values.
    List,
    /// Unordered mapping of string keys to values.
    Struct,
}

impl Kind {
    /// All kinds, in declaration order.
    pub const ALL: [Kind; 6] = [
        Kind::Null,
        Kind::Bool,
        Kind::Number,
        Kind::String,
        Kind::List,
        Kind::Struct,
    ];

    /// The lower-case name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::List => "list",
            Kind::Struct => "struct",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of a structured value tree.
///
/// Exactly one variant is active. Accessors for a specific variant return
/// [`CoreError::VariantMismatch`] when another variant is active.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum StructuredValue {
    /// Explicit null marker.
    #[default]
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Number scalar. JSON does not distinguish integers from floats.
    Number(f64),
    /// Text scalar.
    String(String),
    /// Ordered list of values.
    List(ListValue),
    /// Mapping of keys to entries.
    Struct(Struct),
}

impl StructuredValue {
    /// The null value.
    pub fn null() -> Self {
        StructuredValue::Null
    }

    /// Which variant is active.
    pub fn kind(&self) -> Kind {
        match self {
            StructuredValue::Null => Kind::Null,
            StructuredValue::Bool(_) => Kind::Bool,
            StructuredValue::Number(_) => Kind::Number,
            StructuredValue::String(_) => Kind::String,
            StructuredValue::List(_) => Kind::List,
            StructuredValue::Struct(_) => Kind::Struct,
        }
    }

    /// Returns true if the null variant is active.
    pub fn is_null(&self) -> bool {
        matches!(self, StructuredValue::Null)
    }

    /// The boolean payload.
    pub fn as_bool(&self) -> Result<bool, CoreError> {
        match self {
            StructuredValue::Bool(b) => Ok(*b),
            other => Err(other.mismatch(Kind::Bool)),
        }
    }

    /// The number payload.
    pub fn as_number(&self) -> Result<f64, CoreError> {
        match self {
            StructuredValue::Number(n) => Ok(*n),
            other => Err(other.mismatch(Kind::Number)),
        }
    }

    /// The string payload.
    pub fn as_str(&self) -> Result<&str, CoreError> {
        match self {
            StructuredValue::String(s) => Ok(s),
            other => Err(other.mismatch(Kind::String)),
        }
    }

    /// The list payload.
    pub fn as_list(&self) -> Result<&ListValue, CoreError> {
        match self {
            StructuredValue::List(list) => Ok(list),
            other => Err(other.mismatch(Kind::List)),
        }
    }

    /// Mutable access to the list payload.
    pub fn as_list_mut(&mut self) -> Result<&mut ListValue, CoreError> {
        match self {
            StructuredValue::List(list) => Ok(list),
            other => Err(other.mismatch(Kind::List)),
        }
    }

    /// The struct payload.
    pub fn as_struct(&self) -> Result<&Struct, CoreError> {
        match self {
            StructuredValue::Struct(s) => Ok(s),
            other => Err(other.mismatch(Kind::Struct)),
        }
    }

    /// Mutable access to the struct payload.
    pub fn as_struct_mut(&mut self) -> Result<&mut Struct, CoreError> {
        match self {
            StructuredValue::Struct(s) => Ok(s),
            other => Err(other.mismatch(Kind::Struct)),
        }
    }

    /// Take the list payload.
    pub fn into_list(self) -> Result<ListValue, CoreError> {
        match self {
            StructuredValue::List(list) => Ok(list),
            other => Err(other.mismatch(Kind::List)),
        }
    }

    /// Take the struct payload.
    pub fn into_struct(self) -> Result<Struct, CoreError> {
        match self {
            StructuredValue::Struct(s) => Ok(s),
            other => Err(other.mismatch(Kind::Struct)),
        }
    }

    fn mismatch(&self, expected: Kind) -> CoreError {
        CoreError::VariantMismatch {
            expected,
            actual: self.kind(),
        }
    }
}

/// Ordered list of structured values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListValue {
    values: Vec<StructuredValue>,
}

impl ListValue {
    /// An empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value.
    pub fn push(&mut self, value: impl Into<StructuredValue>) {
        self.values.push(value.into());
    }

    /// The element at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&StructuredValue> {
        self.values.get(index)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the list has no elements.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over the elements in order.
    pub fn iter(&self) -> std::slice::Iter<'_, StructuredValue> {
        self.values.iter()
    }

    /// The elements as a slice.
    pub fn as_slice(&self) -> &[StructuredValue] {
        &self.values
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_vec(self) -> Vec<StructuredValue> {
        self.values
    }
}

impl From<Vec<StructuredValue>> for ListValue {
    fn from(values: Vec<StructuredValue>) -> Self {
        Self { values }
    }
}

impl FromIterator<StructuredValue> for ListValue {
    fn from_iter<I: IntoIterator<Item = StructuredValue>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ListValue {
    type Item = StructuredValue;
    type IntoIter = std::vec::IntoIter<StructuredValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a ListValue {
    type Item = &'a StructuredValue;
    type IntoIter = std::slice::Iter<'a, StructuredValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// Unordered mapping of string keys to entries.
///
/// Keys are stored sorted so that iteration (and therefore violation
/// enumeration and canonical encoding) is deterministic. Key order carries
/// no meaning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Struct {
    fields: BTreeMap<String, Option<StructuredValue>>,
}

impl Struct {
    /// An empty struct.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a present value, returning the previous entry for `key`.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<StructuredValue>,
    ) -> Option<Option<StructuredValue>> {
        self.fields.insert(key.into(), Some(value.into()))
    }

    /// Insert an absent entry, returning the previous entry for `key`.
    pub fn insert_absent(&mut self, key: impl Into<String>) -> Option<Option<StructuredValue>> {
        self.fields.insert(key.into(), None)
    }

    /// Insert an entry that may be absent.
    pub fn insert_entry(
        &mut self,
        key: impl Into<String>,
        entry: Option<StructuredValue>,
    ) -> Option<Option<StructuredValue>> {
        self.fields.insert(key.into(), entry)
    }

    /// The value for `key`, if the key exists and its entry is present.
    pub fn get(&self, key: &str) -> Option<&StructuredValue> {
        self.fields.get(key).and_then(Option::as_ref)
    }

    /// The raw entry for `key`. `Some(None)` is an absent entry.
    pub fn entry(&self, key: &str) -> Option<&Option<StructuredValue>> {
        self.fields.get(key)
    }

    /// Mutable access to the value for `key`, if present.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut StructuredValue> {
        self.fields.get_mut(key).and_then(Option::as_mut)
    }

    /// Remove and return the entry for `key`.
    pub fn remove(&mut self, key: &str) -> Option<Option<StructuredValue>> {
        self.fields.remove(key)
    }

    /// Returns true if `key` has an entry, present or absent.
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the struct has no entries.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over entries in sorted key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Option<StructuredValue>> {
        self.fields.iter()
    }

    /// Iterate over keys in sorted order.
    pub fn keys(&self) -> btree_map::Keys<'_, String, Option<StructuredValue>> {
        self.fields.keys()
    }
}

impl FromIterator<(String, StructuredValue)> for Struct {
    fn from_iter<I: IntoIterator<Item = (String, StructuredValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k, Some(v))).collect(),
        }
    }
}

impl FromIterator<(String, Option<StructuredValue>)> for Struct {
    fn from_iter<I: IntoIterator<Item = (String, Option<StructuredValue>)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Struct {
    type Item = (String, Option<StructuredValue>);
    type IntoIter = btree_map::IntoIter<String, Option<StructuredValue>>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a Struct {
    type Item = (&'a String, &'a Option<StructuredValue>);
    type IntoIter = btree_map::Iter<'a, String, Option<StructuredValue>>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl From<bool> for StructuredValue {
    fn from(b: bool) -> Self {
        StructuredValue::Bool(b)
    }
}

impl From<f64> for StructuredValue {
    fn from(n: f64) -> Self {
        StructuredValue::Number(n)
    }
}

impl From<f32> for StructuredValue {
    fn from(n: f32) -> Self {
        StructuredValue::Number(f64::from(n))
    }
}

impl From<i32> for StructuredValue {
    fn from(n: i32) -> Self {
        StructuredValue::Number(f64::from(n))
    }
}

impl From<u32> for StructuredValue {
    fn from(n: u32) -> Self {
        StructuredValue::Number(f64::from(n))
    }
}

impl From<&str> for StructuredValue {
    fn from(s: &str) -> Self {
        StructuredValue::String(s.to_string())
    }
}

impl From<String> for StructuredValue {
    fn from(s: String) -> Self {
        StructuredValue::String(s)
    }
}

impl From<ListValue> for StructuredValue {
    fn from(list: ListValue) -> Self {
        StructuredValue::List(list)
    }
}

impl From<Vec<StructuredValue>> for StructuredValue {
    fn from(values: Vec<StructuredValue>) -> Self {
        StructuredValue::List(ListValue::from(values))
    }
}

impl From<Struct> for StructuredValue {
    fn from(s: Struct) -> Self {
        StructuredValue::Struct(s)
    }
}

impl From<serde_json::Value> for StructuredValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => StructuredValue::Null,
            serde_json::Value::Bool(b) => StructuredValue::Bool(b),
            // `as_f64` only fails under serde_json's arbitrary_precision feature.
            serde_json::Value::Number(n) => StructuredValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => StructuredValue::String(s),
            serde_json::Value::Array(items) => StructuredValue::List(
                items.into_iter().map(StructuredValue::from).collect(),
            ),
            serde_json::Value::Object(map) => StructuredValue::Struct(
                map.into_iter()
                    .map(|(k, v)| (k, StructuredValue::from(v)))
                    .collect(),
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Native JSON mapping
// ---------------------------------------------------------------------------

impl Serialize for StructuredValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StructuredValue::Null => serializer.serialize_unit(),
            StructuredValue::Bool(b) => serializer.serialize_bool(*b),
            StructuredValue::Number(n) if n.is_finite() => serializer.serialize_f64(*n),
            StructuredValue::Number(n) => {
                Err(S::Error::custom(format!("number is not finite: {n}")))
            }
            StructuredValue::String(s) => serializer.serialize_str(s),
            StructuredValue::List(list) => list.serialize(serializer),
            StructuredValue::Struct(s) => s.serialize(serializer),
        }
    }
}

impl Serialize for ListValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.values.len()))?;
        for value in &self.values {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

impl Serialize for Struct {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, entry) in &self.fields {
            match entry {
                Some(value) => map.serialize_entry(key, value)?,
                None => {
                    return Err(S::Error::custom(format!(
                        "struct entry {key:?} has no value"
                    )))
                }
            }
        }
        map.end()
    }
}

struct StructuredValueVisitor;

impl<'de> Visitor<'de> for StructuredValueVisitor {
    type Value = StructuredValue;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("any JSON value")
    }

    fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E> {
        Ok(StructuredValue::Bool(value))
    }

    fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
        Ok(StructuredValue::Number(value as f64))
    }

    fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E> {
        Ok(StructuredValue::Number(value as f64))
    }

    fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E> {
        Ok(StructuredValue::Number(value))
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
        Ok(StructuredValue::String(value.to_string()))
    }

    fn visit_string<E>(self, value: String) -> Result<Self::Value, E> {
        Ok(StructuredValue::String(value))
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E> {
        Ok(StructuredValue::Null)
    }

    fn visit_none<E>(self) -> Result<Self::Value, E> {
        Ok(StructuredValue::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        Deserialize::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut values = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(elem) = seq.next_element()? {
            values.push(elem);
        }
        Ok(StructuredValue::List(ListValue { values }))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        // Duplicate keys: the last occurrence wins, as with serde_json::Value.
        let mut fields = BTreeMap::new();
        while let Some((key, value)) = map.next_entry::<String, StructuredValue>()? {
            fields.insert(key, Some(value));
        }
        Ok(StructuredValue::Struct(Struct { fields }))
    }
}

impl<'de> Deserialize<'de> for StructuredValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(StructuredValueVisitor)
    }
}

impl<'de> Deserialize<'de> for ListValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match StructuredValue::deserialize(deserializer)? {
            StructuredValue::List(list) => Ok(list),
            other => Err(de::Error::invalid_type(unexpected(&other), &"a JSON array")),
        }
    }
}

impl<'de> Deserialize<'de> for Struct {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match StructuredValue::deserialize(deserializer)? {
            StructuredValue::Struct(s) => Ok(s),
            other => Err(de::Error::invalid_type(unexpected(&other), &"a JSON object")),
        }
    }
}

fn unexpected(value: &StructuredValue) -> de::Unexpected<'_> {
    match value {
        StructuredValue::Null => de::Unexpected::Unit,
        StructuredValue::Bool(b) => de::Unexpected::Bool(*b),
        StructuredValue::Number(n) => de::Unexpected::Float(*n),
        StructuredValue::String(s) => de::Unexpected::Str(s),
        StructuredValue::List(_) => de::Unexpected::Seq,
        StructuredValue::Struct(_) => de::Unexpected::Map,
    }
}
