//! # Path Tags
//!
//! A [`FieldPath`] locates a node inside a structured value tree. Paths are
//! built segment by segment while walking the tree and rendered in the
//! dotted/indexed form used in violation reports:
//!
//! | Tree                          | Rendered path        |
//! |-------------------------------|----------------------|
//! | `{"a": <here>}`               | `fields.a`           |
//! | `{"a": {"b": <here>}}`        | `fields.a.b`         |
//! | `[1, "x", {"k": <here>}]`     | `list[2].fields.k`   |
//! | `{"a": [<here>]}`             | `fields.a[0]`        |
//! | message field `parameters`    | `parameters.fields.k`|
//!
//! The rule: a segment that directly follows a struct key addresses the
//! entry's value, so it is rendered bare (`.b`, `[0]`). Any other key or
//! index names its container first (`fields.k`, `list[2]`).

use std::fmt;

use serde::{Serialize, Serializer};

/// One step in a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A named field of an enclosing, strongly typed message.
    Field(String),
    /// An entry of a struct mapping.
    Key(String),
    /// A position in a list.
    Index(usize),
}

/// Location of a node inside a structured value tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// The empty path, addressing the root of a tree.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns true if this path addresses the root.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The segments of this path, outermost first.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Append a segment in place.
    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Remove the innermost segment.
    pub fn pop(&mut self) -> Option<Segment> {
        self.segments.pop()
    }

    /// A new path extended by one segment.
    pub fn child(&self, segment: Segment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(segment);
        Self { segments }
    }

    /// A new path extended by a struct key.
    pub fn key(&self, key: impl Into<String>) -> Self {
        self.child(Segment::Key(key.into()))
    }

    /// A new path extended by a list index.
    pub fn index(&self, index: usize) -> Self {
        self.child(Segment::Index(index))
    }

    /// Re-root this path under `prefix`.
    pub fn prefixed(self, prefix: &FieldPath) -> Self {
        if prefix.is_root() {
            return self;
        }
        let mut segments = Vec::with_capacity(prefix.segments.len() + self.segments.len());
        segments.extend(prefix.segments.iter().cloned());
        segments.extend(self.segments);
        Self { segments }
    }

    /// Render as an RFC 6901 JSON Pointer into the native JSON form.
    ///
    /// The root renders as the empty string.
    pub fn to_json_pointer(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            out.push('/');
            match segment {
                Segment::Field(name) | Segment::Key(name) => {
                    out.push_str(&name.replace('~', "~0").replace('/', "~1"));
                }
                Segment::Index(i) => out.push_str(&i.to_string()),
            }
        }
        out
    }
}

impl From<Vec<Segment>> for FieldPath {
    fn from(segments: Vec<Segment>) -> Self {
        Self { segments }
    }
}

impl FromIterator<Segment> for FieldPath {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("(root)");
        }
        let mut prev: Option<&Segment> = None;
        for segment in &self.segments {
            let after_key = matches!(prev, Some(Segment::Key(_)));
            let sep = if prev.is_some() { "." } else { "" };
            match segment {
                Segment::Field(name) => write!(f, "{sep}{name}")?,
                Segment::Key(key) if after_key => write!(f, ".{key}")?,
                Segment::Key(key) => write!(f, "{sep}fields.{key}")?,
                Segment::Index(i) if after_key => write!(f, "[{i}]")?,
                Segment::Index(i) => write!(f, "{sep}list[{i}]")?,
            }
            prev = Some(segment);
        }
        Ok(())
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_display() {
        assert_eq!(FieldPath::root().to_string(), "(root)");
        assert!(FieldPath::root().is_root());
    }

    #[test]
    fn test_struct_key_at_root() {
        assert_eq!(FieldPath::root().key("a").to_string(), "fields.a");
    }

    #[test]
    fn test_nested_struct_keys_collapse() {
        let path = FieldPath::root().key("a").key("b");
        assert_eq!(path.to_string(), "fields.a.b");
    }

    #[test]
    fn test_struct_inside_list() {
        let path = FieldPath::root().index(2).key("k");
        assert_eq!(path.to_string(), "list[2].fields.k");
    }

    #[test]
    fn test_list_inside_struct_entry() {
        let path = FieldPath::root().key("a").index(0);
        assert_eq!(path.to_string(), "fields.a[0]");
    }

    #[test]
    fn test_list_inside_list() {
        let path = FieldPath::root().index(0).index(1);
        assert_eq!(path.to_string(), "list[0].list[1]");
    }

    #[test]
    fn test_message_field_prefix() {
        let inner = FieldPath::root().key("k");
        let prefix = FieldPath::root().child(Segment::Field("parameters".into()));
        assert_eq!(inner.prefixed(&prefix).to_string(), "parameters.fields.k");
    }

    #[test]
    fn test_prefixed_by_root_is_identity() {
        let path = FieldPath::root().key("a");
        assert_eq!(path.clone().prefixed(&FieldPath::root()), path);
    }

    #[test]
    fn test_json_pointer() {
        let path = FieldPath::root().key("a/b").index(3).key("m~n");
        assert_eq!(path.to_json_pointer(), "/a~1b/3/m~0n");
        assert_eq!(FieldPath::root().to_json_pointer(), "");
    }

    #[test]
    fn test_push_pop() {
        let mut path = FieldPath::root();
        path.push(Segment::Key("a".into()));
        path.push(Segment::Index(1));
        assert_eq!(path.depth(), 2);
        assert_eq!(path.pop(), Some(Segment::Index(1)));
        assert_eq!(path.to_string(), "fields.a");
    }

    #[test]
    fn test_serializes_as_rendered_string() {
        let path = FieldPath::root().key("a").key("b");
        assert_eq!(serde_json::to_string(&path).unwrap(), r#""fields.a.b""#);
    }
}
