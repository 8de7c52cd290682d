//! Fixed-window rate limiter middleware.
//!
//! Counts requests per wall-clock second with atomics; the count resets when
//! a new second starts.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::{Extension, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;

#[derive(Clone)]
pub struct RateLimiter {
    /// 0 means unlimited.
    max_per_sec: u64,
    count: Arc<AtomicU64>,
    window: Arc<AtomicU64>,
}

impl RateLimiter {
    pub fn new(max_per_sec: u64) -> Self {
        Self {
            max_per_sec,
            count: Arc::new(AtomicU64::new(0)),
            window: Arc::new(AtomicU64::new(0)),
        }
    }

    fn try_acquire(&self) -> bool {
        if self.max_per_sec == 0 {
            return true;
        }
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        self.try_acquire_at(now)
    }

    fn try_acquire_at(&self, now: u64) -> bool {
        if self.window.swap(now, Ordering::Relaxed) != now {
            self.count.store(1, Ordering::Relaxed);
            return true;
        }
        self.count.fetch_add(1, Ordering::Relaxed) < self.max_per_sec
    }
}

pub async fn rate_limit_middleware(
    Extension(limiter): Extension<RateLimiter>,
    req: Request,
    next: Next,
) -> Response {
    if limiter.try_acquire() {
        next.run(req).await
    } else {
        ApiError::TooManyRequests.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_within_window() {
        let limiter = RateLimiter::new(3);
        assert!(limiter.try_acquire_at(100));
        assert!(limiter.try_acquire_at(100));
        assert!(limiter.try_acquire_at(100));
        assert!(!limiter.try_acquire_at(100));
    }

    #[test]
    fn test_new_window_resets() {
        let limiter = RateLimiter::new(1);
        assert!(limiter.try_acquire_at(5));
        assert!(!limiter.try_acquire_at(5));
        assert!(limiter.try_acquire_at(6));
    }

    #[test]
    fn test_zero_is_unlimited() {
        let limiter = RateLimiter::new(0);
        for _ in 0..1000 {
            assert!(limiter.try_acquire());
        }
    }
}
