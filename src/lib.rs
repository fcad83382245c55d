//! # pkghook
//!
//! Webhook receiver for package-registry and source-push notifications.
//!
//! Each delivery is decoded, classified as a package or push event, flattened
//! into an ordered [`model::LogRecord`] and handed to an injected
//! [`sink::RecordSink`]. The HTTP transport, configuration and OpenTelemetry
//! wiring live alongside the engine but are not required to use it.

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod payload;
pub mod server;
pub mod sink;
pub mod telemetry;
