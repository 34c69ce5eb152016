//! Teburu HTTP server
//!
//! Serves the rows of a spreadsheet as JSON records:
//!
//! - `GET /api/sheet/{id}/{sheet}` lists every row up to the first empty one
//! - `GET /api/sheet/{id}/{sheet}/{row}` returns a single row
//!
//! Rate limiting, response caching and CORS are optional layers configured
//! through [`config::Config`].

pub mod cache;
pub mod config;
pub mod error;
pub mod rate_limit;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::http::Method;
use axum::middleware;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::{Config, MiddlewareConfig};
pub use error::{AppError, AppResult};
pub use state::AppState;

use cache::ResponseCache;
use rate_limit::RateLimiter;

/// Build the application with the enabled middleware.
///
/// Layers run outermost first: tracing, CORS, rate limiting, then the
/// response cache.
pub fn build_app(state: AppState, layers: &MiddlewareConfig) -> Router {
    let mut app = routes::router(state);

    if let Some(config) = &layers.cache {
        let store = Arc::new(ResponseCache::new(config.clone()));
        app = app.layer(middleware::from_fn_with_state(store, cache::cache_responses));
    }

    if let Some(config) = &layers.rate_limit {
        let limiter = Arc::new(RateLimiter::new(config.clone()));
        app = app.layer(middleware::from_fn_with_state(
            limiter,
            rate_limit::limit_requests,
        ));
    }

    if layers.cors {
        app = app.layer(cors_layer());
    }

    app.layer(TraceLayer::new_for_http())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new().allow_origin(Any).allow_methods([
        Method::GET,
        Method::HEAD,
        Method::PUT,
        Method::PATCH,
        Method::POST,
        Method::DELETE,
    ])
}
