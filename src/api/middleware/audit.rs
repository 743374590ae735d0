//! Audit logging middleware.
//!
//! Assigns every request a `RequestId` and logs method, path,
//! response status and latency once the handler has run.

use std::time::{Duration, Instant};

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use crate::api::types::RequestId;

/// Log API access for audit trail.
/// Injects `RequestId` into request extensions for handlers.
pub async fn log_access(mut req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let request_id = RequestId(Uuid::new_v4());
    req.extensions_mut().insert(request_id);

    let started = Instant::now();
    let response = next.run(req).await;

    let status = response.status().as_u16();
    let latency_ms = millis(started.elapsed());
    if response.status().is_server_error() {
        tracing::warn!(%request_id, %method, %path, status, latency_ms, "API access");
    } else {
        tracing::info!(%request_id, %method, %path, status, latency_ms, "API access");
    }

    response
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
