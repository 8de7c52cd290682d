//! Router setup with all API routes and middleware.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::handlers;
use crate::rate_limit::{rate_limit_middleware, RateLimiter};
use crate::state::AppState;

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.allowed_origins);
    let limiter = RateLimiter::new(state.config.server.rate_limit_per_sec);
    let body_limit = state.config.server.max_body_bytes;

    let public_routes = Router::new().route("/health", get(handlers::health));

    let limited_routes = Router::new()
        .route(
            "/chatbot",
            post(handlers::chatbot_message).delete(handlers::chatbot_clear),
        )
        .route("/contact", post(handlers::contact_submit))
        .route("/careers/apply", post(handlers::careers_apply))
        .layer(axum::middleware::from_fn(rate_limit_middleware))
        .layer(axum::Extension(limiter));

    public_routes
        .merge(limited_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
