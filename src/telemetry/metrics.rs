//! Metric instrument factories for pkghook.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! All instruments are created lazily from the `"pkghook"` meter.

use opentelemetry::metrics::{Counter, Histogram, Meter};

/// Returns the shared meter for pkghook instruments.
fn meter() -> Meter {
    opentelemetry::global::meter("pkghook")
}

/// Counter: events accepted and logged.
/// Labels: `kind` ("package" | "push").
pub fn events_received() -> Counter<u64> {
    meter()
        .u64_counter("pkghook.events.received")
        .with_description("Number of webhook events accepted")
        .build()
}

/// Counter: deliveries rejected before a record was emitted.
/// Labels: `reason` ("not_an_object" | "unrecognized" | "missing_field" |
/// "missing_repo" | "body_too_large" | "unreadable_body").
pub fn events_rejected() -> Counter<u64> {
    meter()
        .u64_counter("pkghook.events.rejected")
        .with_description("Number of webhook deliveries rejected")
        .build()
}

/// Histogram: time spent in the decode → classify → extract pipeline.
/// Labels: `outcome` ("ok" | "error").
pub fn processing_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("pkghook.event.processing_duration_ms")
        .with_description("Event processing duration in milliseconds")
        .with_unit("ms")
        .build()
}
