//! Request span helpers.
//!
//! Every webhook delivery runs inside one `webhook.request` span. Records and
//! rejection logs emitted while handling it inherit the span's fields.

use tracing::Span;
use uuid::Uuid;

/// Start a span for one inbound request.
///
/// The `repo` and `event` fields are declared empty and filled once known via
/// [`record_repo`] and [`record_event_kind`].
pub fn start_request_span(method: &str, path: &str, remote_addr: &str, delivery_id: &Uuid) -> Span {
    tracing::info_span!(
        "webhook.request",
        method = method,
        path = path,
        remote_addr = remote_addr,
        delivery_id = %delivery_id,
        repo = tracing::field::Empty,
        event = tracing::field::Empty,
    )
}

/// Record the validated `repo` query parameter on the span.
pub fn record_repo(span: &Span, repo: &str) {
    span.record("repo", repo);
}

/// Record the classified event kind on the span.
pub fn record_event_kind(span: &Span, kind: &str) {
    span.record("event", kind);
}
