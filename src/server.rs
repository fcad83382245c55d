//! HTTP transport around the event engine.
//!
//! Routes:
//! - `/_health` answers `OK` to any method.
//! - `POST /?repo=<name>` runs the body through [`crate::engine::process`].
//! - Everything else is 404, or 405 for non-POST requests to `/`.
//!
//! The transport owns the request span, the record sink and the mapping from
//! engine errors to status codes. The engine itself never sees HTTP types.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::{ConnectInfo, Query, Request, State};
use axum::http::request::Parts;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use http_body_util::LengthLimitError;
use opentelemetry::KeyValue;
use serde::Deserialize;
use tokio::net::TcpListener;
use tracing::{Instrument, Span, error, info};
use uuid::Uuid;

use crate::config::Config;
use crate::engine;
use crate::error::{ClassificationError, EventError, ExtractionError, Result};
use crate::sink::RecordSink;
use crate::telemetry::metrics;
use crate::telemetry::request::{record_event_kind, record_repo, start_request_span};

// ── App State ──

struct AppState {
    max_body_bytes: usize,
    sink: Arc<dyn RecordSink>,
}

// ── Entrypoint ──

/// Build the router (for testing without binding to a port).
pub fn router(config: &Config, sink: Arc<dyn RecordSink>) -> Router {
    let state = Arc::new(AppState {
        max_body_bytes: config.max_body_bytes,
        sink,
    });
    Router::new()
        .route("/_health", any(health))
        .route("/", any(receive))
        .fallback(not_found)
        .with_state(state)
}

/// Serve on an already-bound listener until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    config: &Config,
    sink: Arc<dyn RecordSink>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(config, sink);
    let addr = listener.local_addr()?;
    info!(%addr, "webhook receiver listening");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;
    info!("webhook receiver stopped");
    Ok(())
}

// ── Health ──

async fn health() -> &'static str {
    "OK"
}

// ── Fallback ──

async fn not_found(method: Method, uri: Uri) -> Response {
    error!(method = %method, path = uri.path(), "Not found");
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

// ── POST / ──

#[derive(Deserialize)]
struct DeliveryQuery {
    repo: Option<String>,
}

async fn receive(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let remote_addr = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let delivery_id = Uuid::new_v4();
    let span = start_request_span(
        parts.method.as_str(),
        parts.uri.path(),
        &remote_addr,
        &delivery_id,
    );

    handle_delivery(state, parts, body, span.clone())
        .instrument(span)
        .await
}

async fn handle_delivery(state: Arc<AppState>, parts: Parts, body: Body, span: Span) -> Response {
    if parts.method != Method::POST {
        error!("Method not allowed");
        return (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response();
    }

    let repo = Query::<DeliveryQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(query)| query.repo)
        .filter(|repo| !repo.is_empty());
    let Some(repo) = repo else {
        error!("Missing 'repo' query parameter");
        reject("missing_repo");
        return (StatusCode::BAD_REQUEST, "Missing 'repo' query parameter").into_response();
    };
    record_repo(&span, &repo);

    let body = match read_body(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(response) => return response,
    };

    let started = Instant::now();
    let result = engine::process(&body, state.sink.as_ref());
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

    match result {
        Ok(delivery) => {
            let kind = delivery.kind();
            record_event_kind(&span, kind.as_str());
            metrics::events_received().add(1, &[KeyValue::new("kind", kind.as_str())]);
            metrics::processing_duration_ms()
                .record(elapsed_ms, &[KeyValue::new("outcome", "ok")]);
            (StatusCode::OK, kind.response_text()).into_response()
        }
        Err(err) => {
            error!(reason = err.reason(), error = %err, "Rejected event");
            reject(err.reason());
            metrics::processing_duration_ms()
                .record(elapsed_ms, &[KeyValue::new("outcome", "error")]);
            (StatusCode::BAD_REQUEST, response_message(&err)).into_response()
        }
    }
}

async fn read_body(body: Body, limit: usize) -> std::result::Result<Bytes, Response> {
    axum::body::to_bytes(body, limit).await.map_err(|err| {
        let inner = err.into_inner();
        let too_large = is_length_limit(&*inner);

        if too_large {
            error!(limit, "Request body too large");
            reject("body_too_large");
            (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response()
        } else {
            error!(error = %inner, "Failed to read request body");
            reject("unreadable_body");
            (StatusCode::BAD_REQUEST, "Failed to read request body").into_response()
        }
    })
}

fn is_length_limit(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}

fn reject(reason: &'static str) {
    metrics::events_rejected().add(1, &[KeyValue::new("reason", reason)]);
}

/// Human-readable response text for an engine error.
fn response_message(err: &EventError) -> String {
    match err {
        EventError::Classification(ClassificationError::NotAnObject) => {
            "Request body is empty or not a JSON object".to_string()
        }
        EventError::Classification(ClassificationError::Unrecognized) => {
            "Unsupported event".to_string()
        }
        EventError::Extraction(ExtractionError::MissingField(path)) => {
            format!("Field '{path}' is missing or has the wrong type")
        }
    }
}
