//! # YAML Import
//!
//! Free-form parameters are often authored as YAML. YAML has a richer type
//! system than JSON (tags, anchors, non-string keys); only the JSON
//! compatible subset maps onto a structured value:
//!
//! - Tags are ignored and the inner value converted.
//! - Number and boolean keys are stringified; any other key type fails, as
//!   do two keys that stringify to the same text (`1` and `"1"`).
//! - `.nan` / `.inf` fail, since they have no JSON representation.

use serde_yaml::Value as Yaml;

use crate::error::DecodingError;
use crate::path::{FieldPath, Segment};
use crate::value::{ListValue, Struct, StructuredValue};

impl StructuredValue {
    /// Parse a YAML document into a structured value.
    ///
    /// # Errors
    ///
    /// Returns [`DecodingError::Yaml`] for malformed YAML and
    /// [`DecodingError::UnsupportedKey`] / [`DecodingError::NonFiniteNumber`]
    /// for YAML that has no JSON equivalent.
    pub fn from_yaml_str(s: &str) -> Result<Self, DecodingError> {
        let yaml: Yaml = serde_yaml::from_str(s).map_err(|e| {
            tracing::debug!(error = %e, "malformed yaml");
            DecodingError::Yaml(e.to_string())
        })?;
        Self::try_from(&yaml)
    }
}

impl TryFrom<&Yaml> for StructuredValue {
    type Error = DecodingError;

    fn try_from(yaml: &Yaml) -> Result<Self, Self::Error> {
        let mut path = FieldPath::root();
        convert(yaml, &mut path)
    }
}

fn convert(yaml: &Yaml, path: &mut FieldPath) -> Result<StructuredValue, DecodingError> {
    match yaml {
        Yaml::Null => Ok(StructuredValue::Null),
        Yaml::Bool(b) => Ok(StructuredValue::Bool(*b)),
        Yaml::Number(n) => match n.as_f64() {
            Some(f) if f.is_finite() => Ok(StructuredValue::Number(f)),
            _ => Err(DecodingError::NonFiniteNumber { path: path.clone() }),
        },
        Yaml::String(s) => Ok(StructuredValue::String(s.clone())),
        Yaml::Sequence(seq) => {
            let mut list = ListValue::new();
            for (i, item) in seq.iter().enumerate() {
                path.push(Segment::Index(i));
                list.push(convert(item, path)?);
                path.pop();
            }
            Ok(StructuredValue::List(list))
        }
        Yaml::Mapping(map) => {
            let mut out = Struct::new();
            for (k, v) in map {
                let key = match k {
                    Yaml::String(s) => s.clone(),
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    other => return Err(DecodingError::UnsupportedKey(format!("{other:?}"))),
                };
                if out.contains_key(&key) {
                    return Err(DecodingError::UnsupportedKey(format!(
                        "{key:?} collides with another key after stringification"
                    )));
                }
                path.push(Segment::Key(key.clone()));
                let value = convert(v, path)?;
                path.pop();
                out.insert(key, value);
            }
            Ok(StructuredValue::Struct(out))
        }
        Yaml::Tagged(tagged) => convert(&tagged.value, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_to_value() {
        let yaml_str = r#"
pipeline: train
version: "1.0.0"
epochs: 42
enabled: true
tags:
  - one
  - two
nested:
  lr: 0.01
  note: ~
"#;
        let value = StructuredValue::from_yaml_str(yaml_str).unwrap();
        let s = value.as_struct().unwrap();
        assert_eq!(s.get("pipeline"), Some(&StructuredValue::from("train")));
        assert_eq!(s.get("version"), Some(&StructuredValue::from("1.0.0")));
        assert_eq!(s.get("epochs"), Some(&StructuredValue::Number(42.0)));
        assert_eq!(s.get("enabled"), Some(&StructuredValue::Bool(true)));
        let tags = s.get("tags").unwrap().as_list().unwrap();
        assert_eq!(tags.get(1), Some(&StructuredValue::from("two")));
        let nested = s.get("nested").unwrap().as_struct().unwrap();
        assert_eq!(nested.get("lr"), Some(&StructuredValue::Number(0.01)));
        assert_eq!(nested.get("note"), Some(&StructuredValue::Null));
    }

    #[test]
    fn test_non_string_keys_stringified() {
        let value = StructuredValue::from_yaml_str("1: a\ntrue: b\n").unwrap();
        let s = value.as_struct().unwrap();
        assert!(s.contains_key("1"));
        assert!(s.contains_key("true"));
    }

    #[test]
    fn test_colliding_stringified_keys_rejected() {
        let err = StructuredValue::from_yaml_str("1: a\n\"1\": b\n").unwrap_err();
        match err {
            DecodingError::UnsupportedKey(msg) => assert!(msg.contains("\"1\""), "{msg}"),
            other => panic!("Expected UnsupportedKey, got: {other}"),
        }
        assert!(StructuredValue::from_yaml_str("true: a\n\"true\": b\n").is_err());
    }

    #[test]
    fn test_sequence_key_rejected() {
        let err = StructuredValue::from_yaml_str("? [a, b]\n: c\n").unwrap_err();
        assert!(matches!(err, DecodingError::UnsupportedKey(_)));
    }

    #[test]
    fn test_nan_rejected_with_path() {
        let err = StructuredValue::from_yaml_str("a:\n  - .nan\n").unwrap_err();
        match err {
            DecodingError::NonFiniteNumber { path } => assert_eq!(path.to_string(), "fields.a[0]"),
            other => panic!("Expected NonFiniteNumber, got: {other}"),
        }
    }

    #[test]
    fn test_tags_ignored() {
        let value = StructuredValue::from_yaml_str("!custom text\n").unwrap();
        assert_eq!(value, StructuredValue::from("text"));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = StructuredValue::from_yaml_str("a: [1, 2\n").unwrap_err();
        assert!(matches!(err, DecodingError::Yaml(_)));
    }
}
