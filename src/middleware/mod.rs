//! Request middleware: authentication extractors, rate limiting,
//! security headers, and request logging.

pub mod auth;
mod rate_limiter;
mod security;
mod tracing;

use axum::http::HeaderMap;

pub use auth::{AdminUser, AuthenticatedUser};
pub use rate_limiter::RateLimiter;
pub use security::{hsts_header, security_headers};
pub use tracing::request_tracing;

/// Best-effort client address from proxy headers. `x-forwarded-for` may
/// carry a chain; only the first hop identifies the client.
pub(crate) fn client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());

    forwarded.or_else(|| {
        headers
            .get("x-real-ip")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_ip_prefers_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.2"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.3"));

        assert_eq!(client_ip(&headers).as_deref(), Some("203.0.113.9"));
    }

    #[test]
    fn test_client_ip_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.3"));

        assert_eq!(client_ip(&headers).as_deref(), Some("10.0.0.3"));
        assert_eq!(client_ip(&HeaderMap::new()), None);
    }
}
