//! Route definitions and router construction.

use axum::Router;
use axum::http::HeaderName;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::bootstrap::{AxumContext, CorsConfig};
use crate::handlers;
use crate::state::AppState;

/// Build CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = match config {
        CorsConfig::AllowAll => CorsLayer::new().allow_origin(Any),
        CorsConfig::AllowOrigins(origins) => {
            use axum::http::HeaderValue;
            let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new().allow_origin(allowed)
        }
    };
    // The browser client reads these off audio responses.
    layer
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([
            HeaderName::from_static(handlers::SESSION_HEADER),
            HeaderName::from_static(handlers::AUTHOR_HEADER),
            HeaderName::from_static(handlers::VOICE_HEADER),
        ])
}

/// All API routes without the `/api` prefix (nested by the caller).
pub(crate) fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/load", post(handlers::reader::load))
        .route("/audio/{index}", get(handlers::reader::audio))
        .route("/current", get(handlers::reader::current))
        .route("/reset", post(handlers::reader::reset))
        .route("/voices", get(handlers::reader::voices))
}

/// Create the main router with all routes and middleware.
pub fn create_router(ctx: AxumContext, cors_config: &CorsConfig) -> Router {
    let state: AppState = Arc::new(ctx);
    let cors = build_cors_layer(cors_config);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes().with_state(state).layer(cors))
        .layer(TraceLayer::new_for_http())
}

/// Health check endpoint.
pub(crate) async fn health_check() -> &'static str {
    "OK"
}
