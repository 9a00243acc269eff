use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::Error;

const WINDOW: Duration = Duration::from_secs(60);

/// Sliding one-minute window per client IP. Each router tier carries its
/// own limiter instance with its own limit.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    hits: Arc<Mutex<HashMap<String, VecDeque<Instant>>>>,
}

impl RateLimiter {
    fn new(limit: u32) -> Self {
        Self::with_window(limit, WINDOW)
    }

    fn with_window(limit: u32, window: Duration) -> Self {
        Self {
            limit: limit.max(1),
            window,
            hits: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// `Err` carries the seconds until the oldest hit leaves the window.
    fn allow(&self, key: &str) -> std::result::Result<(), u64> {
        let mut guard = self.hits.lock().expect("rate limiter mutex poisoned");
        let now = Instant::now();

        // The key comes from a client-controlled header, so emptied windows
        // must be dropped or the map grows without bound.
        guard.retain(|_, window| {
            while let Some(front) = window.front() {
                if now.duration_since(*front) >= self.window {
                    window.pop_front();
                } else {
                    break;
                }
            }
            !window.is_empty()
        });

        let window = guard.entry(key.to_string()).or_default();
        if (window.len() as u32) < self.limit {
            window.push_back(now);
            Ok(())
        } else {
            let oldest = window.front().copied().unwrap_or(now);
            let elapsed = now.duration_since(oldest);
            let retry_after = self.window.saturating_sub(elapsed).as_secs().max(1);
            Err(retry_after)
        }
    }
}

pub fn per_minute(limit: u32) -> RateLimiter {
    RateLimiter::new(limit)
}

pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = client_ip(&req);
    match limiter.allow(&ip) {
        Ok(()) => next.run(req).await,
        Err(retry_after_secs) => {
            tracing::warn!(ip = %ip, "rate limit exceeded");
            Error::RateLimited { retry_after_secs }.into_response()
        }
    }
}

/// First hop of X-Forwarded-For when present (the service runs behind a
/// reverse proxy), loopback otherwise.
fn client_ip(req: &Request<Body>) -> String {
    req.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "127.0.0.1".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enforces_per_key_limit() {
        let limiter = RateLimiter::new(3);
        assert!(limiter.allow("1.2.3.4").is_ok());
        assert!(limiter.allow("1.2.3.4").is_ok());
        assert!(limiter.allow("1.2.3.4").is_ok());

        let retry = limiter.allow("1.2.3.4").unwrap_err();
        assert!(retry >= 1 && retry <= 60);
    }

    #[test]
    fn keys_are_independent() {
        let limiter = RateLimiter::new(1);
        assert!(limiter.allow("1.2.3.4").is_ok());
        assert!(limiter.allow("5.6.7.8").is_ok());
        assert!(limiter.allow("1.2.3.4").is_err());
    }

    #[test]
    fn idle_keys_are_evicted_once_their_window_empties() {
        let limiter = RateLimiter::with_window(1, Duration::from_millis(10));
        for i in 0..50 {
            assert!(limiter.allow(&format!("10.0.0.{i}")).is_ok());
        }
        assert_eq!(limiter.hits.lock().unwrap().len(), 50);

        std::thread::sleep(Duration::from_millis(20));
        assert!(limiter.allow("10.1.0.1").is_ok());

        let guard = limiter.hits.lock().unwrap();
        assert_eq!(guard.len(), 1);
        assert!(guard.contains_key("10.1.0.1"));
    }

    #[test]
    fn zero_limit_is_clamped_to_one() {
        let limiter = RateLimiter::new(0);
        assert!(limiter.allow("1.2.3.4").is_ok());
        assert!(limiter.allow("1.2.3.4").is_err());
    }
}
