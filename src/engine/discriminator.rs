//! Envelope discriminator: decides which event shape a payload matches.

use serde_json::Value;

use crate::error::ClassificationError;
use crate::model::EventKind;
use crate::payload::Object;

/// Outcome of classifying an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidate {
    /// The envelope matches a recognized shape; extraction decides whether it
    /// is complete.
    Event(EventKind),
    Unknown,
}

/// Classify a decoded payload.
///
/// First match wins:
/// 1. a `package` key holding an object is a package event;
/// 2. a `commits` array, or both `after` and `before`, is a push;
/// 3. anything else is [`Candidate::Unknown`].
///
/// Only the envelope is inspected. Structural checks inside the matched shape
/// belong to the extractor.
pub fn classify(raw: &Value) -> Result<Candidate, ClassificationError> {
    let envelope = raw.as_object().ok_or(ClassificationError::NotAnObject)?;
    Ok(classify_object(envelope))
}

pub(crate) fn classify_object(envelope: &Object) -> Candidate {
    if envelope.get("package").is_some_and(Value::is_object) {
        return Candidate::Event(EventKind::Package);
    }

    let has_commits = envelope.get("commits").is_some_and(Value::is_array);
    let has_refs = envelope.contains_key("after") && envelope.contains_key("before");
    if has_commits || has_refs {
        return Candidate::Event(EventKind::Push);
    }

    Candidate::Unknown
}
