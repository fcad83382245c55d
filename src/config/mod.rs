//! Typed configuration from environment variables.
//!
//! Loads once at startup and fails fast on values that do not parse.
//! Nothing here is read by the event engine itself; it only shapes the
//! transport and telemetry around it.

use crate::error::{Error, Result};

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    /// Listen address for the webhook endpoint.
    pub bind: String,
    /// Request bodies larger than this are rejected with 413.
    pub max_body_bytes: usize,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            otel_endpoint: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let max_body_bytes = match non_empty(lookup("PKGHOOK_MAX_BODY_BYTES")) {
            Some(raw) => parse_body_limit(&raw)?,
            None => defaults.max_body_bytes,
        };

        Ok(Self {
            bind: non_empty(lookup("PKGHOOK_BIND")).unwrap_or(defaults.bind),
            max_body_bytes,
            otel_endpoint: non_empty(lookup("OTEL_ENDPOINT")),
            log_level: non_empty(lookup("LOG_LEVEL")).unwrap_or(defaults.log_level),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_body_limit(raw: &str) -> Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err(Error::Config(
            "PKGHOOK_MAX_BODY_BYTES must be greater than zero".to_string(),
        )),
        Ok(limit) => Ok(limit),
        Err(e) => Err(Error::Config(format!(
            "PKGHOOK_MAX_BODY_BYTES is not a valid byte count ({raw:?}): {e}"
        ))),
    }
}
