//! Event engine: decode, classify, extract, emit.
//!
//! The engine is stateless. Each call handles one fully-buffered JSON
//! document and either hands exactly one record to the sink or returns an
//! error without emitting anything.

pub mod discriminator;
pub mod extractor;

pub use discriminator::{Candidate, classify};
pub use extractor::{Extraction, TAG_PATH, extract};

use serde_json::Value;

use crate::error::{ClassificationError, EventError};
use crate::model::{EventKind, EventVariant, LogRecord};
use crate::sink::RecordSink;

/// A successfully processed delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub variant: EventVariant,
    pub record: LogRecord,
}

impl Delivery {
    pub fn kind(&self) -> EventKind {
        self.variant.kind()
    }
}

/// Decode the first JSON value of a request body.
///
/// Bytes after the first complete value are ignored. Empty, whitespace-only
/// and malformed bodies are all reported as [`ClassificationError::NotAnObject`].
pub fn decode(body: &[u8]) -> Result<Value, ClassificationError> {
    match serde_json::Deserializer::from_slice(body)
        .into_iter::<Value>()
        .next()
    {
        Some(Ok(value)) => Ok(value),
        Some(Err(e)) => {
            tracing::debug!(error = %e, "failed to decode request body");
            Err(ClassificationError::NotAnObject)
        }
        None => Err(ClassificationError::NotAnObject),
    }
}

/// Classify and extract an already-decoded payload.
pub fn process_value(raw: &Value) -> Result<Delivery, EventError> {
    let envelope = raw.as_object().ok_or(ClassificationError::NotAnObject)?;
    let Candidate::Event(kind) = discriminator::classify_object(envelope) else {
        return Err(ClassificationError::Unrecognized.into());
    };
    let Extraction { variant, record } = extract(kind, envelope)?;
    Ok(Delivery { variant, record })
}

/// Run the whole pipeline over a request body and emit the record to `sink`.
pub fn process(body: &[u8], sink: &dyn RecordSink) -> Result<Delivery, EventError> {
    let raw = decode(body)?;
    let delivery = process_value(&raw)?;
    sink.emit(delivery.kind(), &delivery.record);
    Ok(delivery)
}
