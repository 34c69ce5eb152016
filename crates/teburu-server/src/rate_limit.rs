//! Per-client request rate limiting
//!
//! Token bucket keyed by client IP. Buckets idle longer than the expiry are
//! dropped on the next sweep.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use parking_lot::{Mutex, RwLock};
use serde_json::json;

// ============================================================================
// Rate Limit Configuration
// ============================================================================

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Tokens added per second
    pub rate: f64,
    /// Bucket capacity
    pub burst: u32,
    /// Idle time after which a client's bucket is forgotten
    pub expires_in: Duration,
    /// Whether to include `X-RateLimit-*` headers in responses
    pub include_headers: bool,
}

impl RateLimitConfig {
    /// `rate` requests per second with a burst of `floor(rate)`, at least 1
    pub fn per_second(rate: f64) -> Self {
        Self {
            rate,
            burst: (rate.floor() as u32).max(1),
            expires_in: Duration::from_secs(3 * 60),
            include_headers: true,
        }
    }
}

// ============================================================================
// Rate Limit Result
// ============================================================================

/// Result of a rate limit check
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    /// Whether the request is allowed
    pub allowed: bool,
    /// Whole tokens left in the bucket
    pub remaining: u32,
    /// Bucket capacity
    pub limit: u32,
    /// Time until the bucket is full again
    pub reset_after: Duration,
    /// Time until one token is available (only if not allowed)
    pub retry_after: Option<Duration>,
}

impl RateLimitResult {
    fn allowed(remaining: u32, limit: u32, reset_after: Duration) -> Self {
        Self {
            allowed: true,
            remaining,
            limit,
            reset_after,
            retry_after: None,
        }
    }

    fn denied(limit: u32, retry_after: Duration, reset_after: Duration) -> Self {
        Self {
            allowed: false,
            remaining: 0,
            limit,
            reset_after,
            retry_after: Some(retry_after),
        }
    }

    /// Headers to include in a response
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            ("x-ratelimit-limit", self.limit.to_string()),
            ("x-ratelimit-remaining", self.remaining.to_string()),
            ("x-ratelimit-reset", ceil_secs(self.reset_after).to_string()),
        ];

        if let Some(retry) = self.retry_after {
            headers.push(("retry-after", ceil_secs(retry).to_string()));
        }

        headers
    }
}

fn ceil_secs(d: Duration) -> u64 {
    d.as_secs().saturating_add(u64::from(d.subsec_nanos() > 0))
}

// ============================================================================
// Rate Limiter
// ============================================================================

#[derive(Debug, Clone)]
struct Bucket {
    tokens: f64,
    updated: Instant,
}

impl Bucket {
    fn full(config: &RateLimitConfig, now: Instant) -> Self {
        Self {
            tokens: f64::from(config.burst),
            updated: now,
        }
    }

    fn refill(&mut self, config: &RateLimitConfig, now: Instant) {
        let elapsed = now.saturating_duration_since(self.updated).as_secs_f64();
        self.tokens = (self.tokens + elapsed * config.rate).min(f64::from(config.burst));
        self.updated = now;
    }

    /// Time until the bucket holds `target` tokens, saturating for very slow rates
    fn time_to(&self, target: f64, rate: f64) -> Duration {
        let missing = (target - self.tokens).max(0.0);
        Duration::try_from_secs_f64(missing / rate).unwrap_or(Duration::MAX)
    }
}

/// Token bucket rate limiter keyed by client
pub struct RateLimiter {
    config: RateLimitConfig,
    store: RwLock<HashMap<String, Bucket>>,
    last_sweep: Mutex<Instant>,
}

impl RateLimiter {
    pub fn new(mut config: RateLimitConfig) -> Self {
        config.rate = config.rate.max(f64::MIN_POSITIVE);
        Self {
            config,
            store: RwLock::new(HashMap::new()),
            last_sweep: Mutex::new(Instant::now()),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Check and consume a token if allowed
    pub fn acquire(&self, key: &str) -> RateLimitResult {
        self.acquire_at(key, Instant::now())
    }

    fn acquire_at(&self, key: &str, now: Instant) -> RateLimitResult {
        self.maybe_sweep(now);

        let mut store = self.store.write();
        let bucket = store
            .entry(key.to_string())
            .or_insert_with(|| Bucket::full(&self.config, now));
        bucket.refill(&self.config, now);

        let allowed = bucket.tokens >= 1.0;
        if allowed {
            bucket.tokens -= 1.0;
        }
        self.result_for(bucket, allowed)
    }

    fn result_for(&self, bucket: &Bucket, allowed: bool) -> RateLimitResult {
        let limit = self.config.burst;
        let reset_after = bucket.time_to(f64::from(limit), self.config.rate);
        if allowed {
            RateLimitResult::allowed(bucket.tokens.floor() as u32, limit, reset_after)
        } else {
            let retry_after = bucket.time_to(1.0, self.config.rate);
            RateLimitResult::denied(limit, retry_after, reset_after)
        }
    }

    /// Number of tracked clients
    pub fn len(&self) -> usize {
        self.store.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.read().is_empty()
    }

    /// Drop buckets idle longer than the expiry
    fn cleanup_at(&self, now: Instant) {
        let expires_in = self.config.expires_in;
        self.store
            .write()
            .retain(|_, bucket| now.saturating_duration_since(bucket.updated) < expires_in);
    }

    fn maybe_sweep(&self, now: Instant) {
        let mut last = self.last_sweep.lock();
        if now.saturating_duration_since(*last) >= self.config.expires_in {
            *last = now;
            drop(last);
            self.cleanup_at(now);
        }
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Client identifier: first `X-Forwarded-For` entry, then `X-Real-IP`, then
/// the peer address.
pub fn client_ip(headers: &HeaderMap, peer: Option<IpAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = real_ip {
        return ip.to_string();
    }

    peer.map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn apply_headers(headers: &mut HeaderMap, result: &RateLimitResult) {
    for (name, value) in result.headers() {
        if let Ok(value) = HeaderValue::from_str(&value) {
            headers.insert(HeaderName::from_static(name), value);
        }
    }
}

/// axum middleware rejecting clients over their rate with 429
pub async fn limit_requests(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());
    let key = client_ip(request.headers(), peer);
    let result = limiter.acquire(&key);

    if !result.allowed {
        tracing::debug!(client = %key, "rate limit exceeded");
        let mut response = (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "message": "rate limit exceeded" })),
        )
            .into_response();
        apply_headers(response.headers_mut(), &result);
        return response;
    }

    let mut response = next.run(request).await;
    if limiter.config().include_headers {
        apply_headers(response.headers_mut(), &result);
    }
    response
}
