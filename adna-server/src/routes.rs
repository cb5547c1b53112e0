//! Route table and middleware stack.

use std::{sync::Arc, time::Duration};

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::config::Config;
use crate::handlers::{
    health, issue_handler, ready, revoke_handler, stats_handler, verify_dna_handler,
    verify_handler,
};
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Router with default config and an empty registry
pub fn create_router() -> Router {
    create_router_with_config(&Config::default())
}

/// Router over a fresh in-memory registry
pub fn create_router_with_config(config: &Config) -> Router {
    create_router_with_state(AppState::from_config(config), config)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn cors_layer(config: &Config) -> CorsLayer {
    match &config.allowed_origins {
        Some(origins) if !origins.is_empty() => {
            let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            tracing::info!(count = origins.len(), "CORS restricted to configured origins");
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        }
        _ => {
            tracing::warn!("CORS open to any origin");
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// Create the application router around prepared state
pub fn create_router_with_state(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .route("/generate-dna", post(issue_handler))
        .route("/verify", post(verify_handler))
        .route("/verify-dna", get(verify_dna_handler))
        .route("/remove-dna/{dna}", delete(revoke_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/api-docs/openapi.json", get(openapi_json))
        .with_state(state)
        .layer(cors_layer(config))
        // Multipart otherwise applies its own 2 MiB cap; uploads are bounded
        // by the body limit below and the per-file cap in `MultipartFields`
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.body_limit_mb * 1024 * 1024))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.timeout_secs),
        ));

    if !config.rate_limit_enabled {
        tracing::debug!("Rate limiting off");
        return router.layer(TraceLayer::new_for_http());
    }

    // Per-IP limits; requires the router to be served with connect info
    let governor = GovernorConfigBuilder::default()
        .per_second(config.rate_limit_per_sec)
        .burst_size(config.rate_limit_burst)
        .finish();

    match governor {
        Some(conf) => {
            tracing::info!(
                per_sec = config.rate_limit_per_sec,
                burst = config.rate_limit_burst,
                "Rate limiting on"
            );
            router
                .layer(GovernorLayer::new(Arc::new(conf)))
                .layer(TraceLayer::new_for_http())
        }
        None => {
            tracing::error!(
                per_sec = config.rate_limit_per_sec,
                burst = config.rate_limit_burst,
                "Invalid rate limit settings, serving without a limiter"
            );
            router.layer(TraceLayer::new_for_http())
        }
    }
}
