//! Ledger Backend
//!
//! REST API hosting sandboxed strategy ledgers: queue intents, settle
//! batches, harvest, fast-withdraw and emergency-exit over HTTP.

pub mod error;
pub mod routes;
pub mod services;
pub mod types;

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, Method, StatusCode},
    middleware::{self, Next},
    response::Response,
    Router,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::warn;

use routes::{health_router, strategies_router};
use services::StrategyRegistry;
use types::Config;

/// Build the application router with its middleware stack
pub fn app(config: Arc<Config>) -> Router {
    let registry = Arc::new(StrategyRegistry::new(config.max_strategies));
    let cors = build_cors_layer(&config);

    Router::new()
        .merge(health_router())
        .merge(strategies_router(registry))
        .layer(middleware::from_fn_with_state(
            config.clone(),
            api_key_middleware,
        ))
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(64 * 1024)) // 64KB max request body
        .layer(TraceLayer::new_for_http())
}

/// Build CORS layer from config
fn build_cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::HeaderName::from_static("x-api-key"),
        ])
}

/// API key authentication middleware
async fn api_key_middleware(
    State(config): State<Arc<Config>>,
    headers: HeaderMap,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    // Skip auth for health check
    if request.uri().path() == "/health" {
        return Ok(next.run(request).await);
    }

    // No keys configured: development mode
    if config.api_keys.is_empty() {
        return Ok(next.run(request).await);
    }

    let api_key = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            warn!("Request missing API key");
            StatusCode::UNAUTHORIZED
        })?;

    // Never log the key itself
    if !config.api_keys.iter().any(|key| key == api_key) {
        warn!("Invalid API key provided");
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(request).await)
}
