//! Field extractor: validates a matched shape and flattens it into a record.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::error::ExtractionError;
use crate::model::{Commit, EventKind, EventVariant, LogRecord, PackageEvent, PushEvent};
use crate::payload::{Object, ObjectExt, string_fields};

/// Path of the container tag, relative to `package.package_version`.
const TAG_CHAIN: &str = "container_metadata.tag.name";

/// Reported when the container tag does not resolve to a string.
pub const TAG_PATH: &str = "package_version.container_metadata.tag.name";

/// A fully validated event and its log record.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub variant: EventVariant,
    pub record: LogRecord,
}

/// Validate `envelope` as an event of `kind` and build its record.
///
/// All-or-nothing: the first missing or mistyped required field aborts with
/// [`ExtractionError::MissingField`] and no record is produced.
pub fn extract(kind: EventKind, envelope: &Object) -> Result<Extraction, ExtractionError> {
    match kind {
        EventKind::Package => extract_package(envelope),
        EventKind::Push => extract_push(envelope),
    }
}

fn extract_package(envelope: &Object) -> Result<Extraction, ExtractionError> {
    let package = envelope.require_object("package", "package")?;
    let registry = package.require_object("registry", "package.registry")?;
    let version = package.require_object("package_version", "package.package_version")?;
    let tag = version
        .get_nested(TAG_CHAIN)
        .and_then(Value::as_str)
        .ok_or_else(|| ExtractionError::missing(TAG_PATH))?;

    let mut record = LogRecord::new();
    flatten(&mut record, package, "");
    flatten(&mut record, registry, "registry.");
    flatten(&mut record, version, "package_version.");
    record.push("tag", tag);

    let owned = |value: Option<&str>| value.map(str::to_string);
    let event = PackageEvent {
        name: owned(package.string("name")),
        version: owned(version.string("version").or_else(|| version.string("name"))),
        id: package.get("id").and_then(Value::as_u64),
        created_at: owned(package.string("created_at")),
        description: owned(package.string("description")),
        ecosystem: owned(package.string("ecosystem")),
        html_url: owned(package.string("html_url")),
        namespace: owned(package.string("namespace")),
        package_type: owned(package.string("package_type")),
        registry: string_fields(registry)
            .into_iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect(),
        tag_name: tag.to_string(),
    };

    Ok(Extraction {
        variant: EventVariant::Package(event),
        record,
    })
}

fn extract_push(envelope: &Object) -> Result<Extraction, ExtractionError> {
    let after = envelope.require_str("after", "after")?;
    let before = envelope.require_str("before", "before")?;
    let raw_commits = envelope
        .get("commits")
        .and_then(Value::as_array)
        .ok_or_else(|| ExtractionError::missing("commits"))?;

    let commits = raw_commits.iter().map(commit_from_value).collect();

    let mut record = LogRecord::new();
    record.push("after", after);
    record.push("before", before);
    record.push("commits_count", raw_commits.len() as u64);
    record.push("commits", raw_commits.clone());

    Ok(Extraction {
        variant: EventVariant::Push(PushEvent {
            after: after.to_string(),
            before: before.to_string(),
            commits,
        }),
        record,
    })
}

/// Read one commit leniently. Senders trim commit objects freely, so absent,
/// null or mistyped fields become empty values instead of failing the push.
fn commit_from_value(value: &Value) -> Commit {
    let Some(commit) = value.as_object() else {
        return Commit::default();
    };
    let text = |key: &str| commit.string(key).unwrap_or_default().to_string();
    Commit {
        id: text("id"),
        added: path_set(commit, "added"),
        modified: path_set(commit, "modified"),
        removed: path_set(commit, "removed"),
        message: text("message"),
        timestamp: text("timestamp"),
        tree_id: text("tree_id"),
        url: text("url"),
    }
}

/// String entries of the array at `key`; anything else is skipped.
fn path_set(commit: &Object, key: &str) -> BTreeSet<String> {
    commit
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

/// Emit every string-valued key of `object` as `prefix + key`.
fn flatten(record: &mut LogRecord, object: &Object, prefix: &str) {
    for (key, value) in string_fields(object) {
        record.push(format!("{prefix}{key}"), value);
    }
}
