//! Per-request access log.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info, warn};

/// Logs method, path, status and duration of every request.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let duration_ms = start.elapsed().as_millis();

    if response.status().is_server_error() {
        warn!(method = %method, path = %path, status, duration_ms, "HTTP request failed");
    } else {
        info!(method = %method, path = %path, status, duration_ms, "HTTP request");
    }

    response
}
