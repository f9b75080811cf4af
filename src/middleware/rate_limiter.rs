//! Per-client request throttling.
//!
//! Each client address gets a token bucket: steady refill at the
//! configured rate with headroom for bursts of twice that. Over-quota
//! requests are answered with 429 before they reach a handler.

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy)]
struct Quota {
    refill_per_second: f64,
    burst: f64,
}

#[derive(Debug)]
struct Bucket {
    level: f64,
    refreshed: Instant,
}

impl Bucket {
    fn full(quota: Quota) -> Self {
        Self {
            level: quota.burst,
            refreshed: Instant::now(),
        }
    }

    /// Credit the elapsed time, then try to take one token.
    fn take(&mut self, quota: Quota) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.refreshed).as_secs_f64();

        self.level = (self.level + elapsed * quota.refill_per_second).min(quota.burst);
        self.refreshed = now;

        if self.level < 1.0 {
            return false;
        }
        self.level -= 1.0;
        true
    }
}

/// Shared request throttle keyed by client address
#[derive(Clone)]
pub struct RateLimiter {
    quota: Quota,
    buckets: Arc<RwLock<HashMap<String, Bucket>>>,
}

impl RateLimiter {
    pub fn new(requests_per_second: u32) -> Self {
        Self {
            quota: Quota {
                refill_per_second: f64::from(requests_per_second),
                burst: f64::from(requests_per_second * 2),
            },
            buckets: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Whether a request from `key` fits the quota right now
    pub async fn allow(&self, key: &str) -> bool {
        let mut buckets = self.buckets.write().await;

        buckets
            .entry(key.to_string())
            .or_insert_with(|| Bucket::full(self.quota))
            .take(self.quota)
    }

    /// Drop buckets that have been idle longer than `max_idle`
    pub async fn prune(&self, max_idle: Duration) {
        let now = Instant::now();

        self.buckets
            .write()
            .await
            .retain(|_, bucket| now.duration_since(bucket.refreshed) < max_idle);
    }

    /// Middleware entry point: throttle or pass the request through
    pub async fn handle(&self, request: Request, next: Next) -> Response {
        let key = super::client_ip(request.headers()).unwrap_or_else(|| "unknown".to_string());

        if !self.allow(&key).await {
            tracing::warn!(client = %key, "Rate limit exceeded");
            return (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, "1")],
                "Too many requests. Please try again later.",
            )
                .into_response();
        }

        next.run(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_burst_allowance_then_denial() {
        let limiter = RateLimiter::new(5);

        let mut allowed = 0;
        while limiter.allow("10.0.0.1").await {
            allowed += 1;
            assert!(allowed <= 10, "bucket refilled past its burst size");
        }

        // Burst headroom is twice the steady rate.
        assert_eq!(allowed, 10);
    }

    #[tokio::test]
    async fn test_clients_do_not_share_buckets() {
        let limiter = RateLimiter::new(1);

        assert!(limiter.allow("10.0.0.1").await);
        assert!(limiter.allow("10.0.0.2").await);
        assert!(limiter.allow("10.0.0.1").await);
        assert!(limiter.allow("10.0.0.2").await);
        assert!(!limiter.allow("10.0.0.1").await);
        assert!(!limiter.allow("10.0.0.2").await);
    }

    #[tokio::test]
    async fn test_prune_drops_idle_buckets() {
        let limiter = RateLimiter::new(1);
        limiter.allow("10.0.0.1").await;

        limiter.prune(Duration::from_secs(0)).await;

        assert!(limiter.buckets.read().await.is_empty());
    }
}
