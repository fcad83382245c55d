//! Fallible accessors over decoded JSON payloads.
//!
//! Every lookup that the extractor depends on goes through these helpers so a
//! missing or mistyped field surfaces as [`ExtractionError::MissingField`]
//! naming the full path, instead of a panic or a silently skipped value.

use serde_json::{Map, Value};

use crate::error::ExtractionError;

/// JSON object as decoded by `serde_json`.
pub type Object = Map<String, Value>;

/// Typed lookups on a JSON object.
pub trait ObjectExt {
    /// The value at `key` if it is an object.
    fn object(&self, key: &str) -> Option<&Object>;

    /// The value at `key` if it is a string.
    fn string(&self, key: &str) -> Option<&str>;

    /// Like [`ObjectExt::object`], reporting `path` when absent or mistyped.
    fn require_object(&self, key: &str, path: &str) -> Result<&Object, ExtractionError> {
        self.object(key).ok_or_else(|| ExtractionError::missing(path))
    }

    /// Like [`ObjectExt::string`], reporting `path` when absent or mistyped.
    fn require_str(&self, key: &str, path: &str) -> Result<&str, ExtractionError> {
        self.string(key).ok_or_else(|| ExtractionError::missing(path))
    }

    /// Walk a dotted path through nested objects.
    ///
    /// Returns `None` as soon as a segment is absent or an intermediate value
    /// is not an object.
    fn get_nested(&self, path: &str) -> Option<&Value>;
}

impl ObjectExt for Object {
    fn object(&self, key: &str) -> Option<&Object> {
        self.get(key).and_then(Value::as_object)
    }

    fn string(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    fn get_nested(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }
}

/// String-valued entries of `object`, sorted by key.
///
/// Non-string values (numbers, bools, nested objects, arrays, null) are skipped.
pub fn string_fields(object: &Object) -> Vec<(&str, &str)> {
    let mut fields: Vec<(&str, &str)> = object
        .iter()
        .filter_map(|(key, value)| value.as_str().map(|s| (key.as_str(), s)))
        .collect();
    fields.sort_unstable_by(|a, b| a.0.cmp(b.0));
    fields
}
