//! Core data model.
//!
//! An inbound webhook is decoded into an [`EventVariant`] and flattened into a
//! [`LogRecord`]: the ordered key-value payload that gets logged for it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// Which recognized event shape a delivery matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Package,
    Push,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Package => "package",
            Self::Push => "push",
        }
    }

    /// Message logged alongside the record.
    pub fn log_message(self) -> &'static str {
        match self {
            Self::Package => "package created",
            Self::Push => "push received",
        }
    }

    /// Response body returned to the webhook sender.
    pub fn response_text(self) -> &'static str {
        match self {
            Self::Package => "Package created successfully",
            Self::Push => "Push received successfully",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified and fully extracted event.
///
/// Payloads matching no known shape never become a variant; they are rejected
/// as [`crate::error::ClassificationError::Unrecognized`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventVariant {
    Package(PackageEvent),
    Push(PushEvent),
}

impl EventVariant {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Package(_) => EventKind::Package,
            Self::Push(_) => EventKind::Push,
        }
    }
}

/// A package (or package version) was published to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageEvent {
    pub name: Option<String>,
    /// `package_version.version`, falling back to `package_version.name`.
    pub version: Option<String>,
    pub id: Option<u64>,
    pub created_at: Option<String>,
    pub description: Option<String>,
    pub ecosystem: Option<String>,
    pub html_url: Option<String>,
    pub namespace: Option<String>,
    pub package_type: Option<String>,
    /// String-valued fields of `package.registry`.
    pub registry: BTreeMap<String, String>,
    /// `package_version.container_metadata.tag.name`. Always present: a
    /// package event without it is rejected.
    pub tag_name: String,
}

/// Commits were pushed to a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushEvent {
    pub after: String,
    pub before: String,
    pub commits: Vec<Commit>,
}

/// One commit of a push. Absent or mistyped fields are left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Commit {
    pub id: String,
    pub added: BTreeSet<String>,
    pub modified: BTreeSet<String>,
    pub removed: BTreeSet<String>,
    pub message: String,
    pub timestamp: String,
    pub tree_id: String,
    pub url: String,
}

// ---------------------------------------------------------------------------
// Log record
// ---------------------------------------------------------------------------

/// Value of one record field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Str(String),
    Int(u64),
    Seq(Vec<Value>),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        Self::Int(value)
    }
}

impl From<Vec<Value>> for FieldValue {
    fn from(value: Vec<Value>) -> Self {
        Self::Seq(value)
    }
}

/// Ordered key-value pairs describing one event.
///
/// Fields keep insertion order, which follows the schema declaration order of
/// the extractor. Serializes as a JSON object in that same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogRecord {
    fields: Vec<(String, FieldValue)>,
}

impl LogRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.push((name.into(), value.into()));
    }

    /// First value recorded under `name`.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Compact JSON rendering, used as the structured log payload.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Serialize for LogRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
