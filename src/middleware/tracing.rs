//! Request logging middleware
//!
//! One structured line per completed request, leveled by response class:
//! 5xx at error, 4xx at warn, everything else at info.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use super::client_ip;

pub async fn request_tracing(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let client = client_ip(request.headers()).unwrap_or_else(|| "-".to_string());

    let started = Instant::now();
    let response = next.run(request).await;

    let status = response.status();
    let latency_ms = started.elapsed().as_millis() as u64;

    if status.is_server_error() {
        tracing::error!(
            %method,
            path,
            client,
            status = status.as_u16(),
            latency_ms,
            "request failed"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            %method,
            path,
            client,
            status = status.as_u16(),
            latency_ms,
            "request rejected"
        );
    } else {
        tracing::info!(
            %method,
            path,
            client,
            status = status.as_u16(),
            latency_ms,
            "request served"
        );
    }

    response
}
