//! Error types for pkghook.
//!
//! Core failures ([`ClassificationError`], [`ExtractionError`]) are caller-input
//! errors: they reject one event and never indicate a fault in the receiver.
//! [`Error`] covers everything around the core (config, IO, telemetry).

use thiserror::Error;

/// The envelope could not be matched to a known event shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassificationError {
    #[error("request body is empty or not a JSON object")]
    NotAnObject,

    #[error("unsupported event")]
    Unrecognized,
}

/// A matched event shape is structurally incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// Path of the first required field that was absent or had the wrong type.
    #[error("{0} field is missing or has the wrong type")]
    MissingField(String),
}

impl ExtractionError {
    pub(crate) fn missing(path: impl Into<String>) -> Self {
        Self::MissingField(path.into())
    }
}

/// Any failure of the classify → extract pipeline for one event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error(transparent)]
    Classification(#[from] ClassificationError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

impl EventError {
    /// Short, stable label used for metrics and log fields.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Classification(ClassificationError::NotAnObject) => "not_an_object",
            Self::Classification(ClassificationError::Unrecognized) => "unrecognized",
            Self::Extraction(ExtractionError::MissingField(_)) => "missing_field",
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
