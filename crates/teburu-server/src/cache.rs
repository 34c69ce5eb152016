//! Response cache
//!
//! Successful GET responses are kept for a fixed TTL, keyed by method, path
//! and query. The total body size is capped; the oldest entries are evicted
//! first.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use parking_lot::RwLock;

/// Default memory budget for cached bodies: 5 MiB
pub const DEFAULT_MAX_BYTES: usize = 5 * 1024 * 1024;

/// Response cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub ttl: Duration,
    pub max_bytes: usize,
}

impl CacheConfig {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }

    pub fn max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

/// A stored response
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
    seq: u64,
    expires_at: Instant,
}

impl CachedResponse {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    fn into_response(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        if let Some(content_type) = self.content_type {
            response.headers_mut().insert(header::CONTENT_TYPE, content_type);
        }
        response
    }
}

#[derive(Default)]
struct Entries {
    map: HashMap<String, CachedResponse>,
    used_bytes: usize,
    next_seq: u64,
}

impl Entries {
    fn remove(&mut self, key: &str) {
        if let Some(old) = self.map.remove(key) {
            self.used_bytes -= old.body.len();
        }
    }

    fn purge_expired(&mut self, now: Instant) {
        let expired: Vec<String> = self
            .map
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in expired {
            self.remove(&key);
        }
    }

    fn evict_oldest(&mut self) -> bool {
        let oldest = self
            .map
            .iter()
            .min_by_key(|(_, entry)| entry.seq)
            .map(|(key, _)| key.clone());
        match oldest {
            Some(key) => {
                self.remove(&key);
                true
            }
            None => false,
        }
    }
}

/// In-memory TTL cache of full responses
pub struct ResponseCache {
    config: CacheConfig,
    entries: RwLock<Entries>,
}

impl ResponseCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(Entries::default()),
        }
    }

    /// Look up a live entry
    pub fn get(&self, key: &str) -> Option<CachedResponse> {
        let now = Instant::now();
        self.entries
            .read()
            .map
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .cloned()
    }

    /// Store a response body. Bodies larger than the whole budget are skipped.
    pub fn insert(
        &self,
        key: String,
        status: StatusCode,
        content_type: Option<HeaderValue>,
        body: Bytes,
    ) -> bool {
        if body.len() > self.config.max_bytes {
            return false;
        }

        let now = Instant::now();
        let mut entries = self.entries.write();
        entries.remove(&key);
        entries.purge_expired(now);
        while entries.used_bytes + body.len() > self.config.max_bytes {
            if !entries.evict_oldest() {
                break;
            }
        }

        entries.used_bytes += body.len();
        let seq = entries.next_seq;
        entries.next_seq += 1;
        entries.map.insert(
            key,
            CachedResponse {
                status,
                content_type,
                body,
                seq,
                expires_at: now + self.config.ttl,
            },
        );
        true
    }

    pub fn len(&self) -> usize {
        self.entries.read().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().map.is_empty()
    }

    /// Bytes of body currently held
    pub fn used_bytes(&self) -> usize {
        self.entries.read().used_bytes
    }
}

fn cache_key(request: &Request) -> String {
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    format!("{} {}", request.method(), target)
}

/// axum middleware serving and filling the response cache
pub async fn cache_responses(
    State(cache): State<Arc<ResponseCache>>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::GET {
        return next.run(request).await;
    }

    let key = cache_key(&request);
    if let Some(hit) = cache.get(&key) {
        let mut response = hit.into_response();
        response
            .headers_mut()
            .insert("x-cache", HeaderValue::from_static("HIT"));
        return response;
    }

    let response = next.run(request).await;
    if !response.status().is_success() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Failed to buffer response for cache: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let content_type = parts.headers.get(header::CONTENT_TYPE).cloned();
    cache.insert(key, parts.status, content_type, bytes.clone());
    parts
        .headers
        .insert("x-cache", HeaderValue::from_static("MISS"));
    Response::from_parts(parts, Body::from(bytes))
}
