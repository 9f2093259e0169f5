//! API layer - HTTP handlers and routing
//!
//! Routes are split into public, authenticated, and admin groups; the
//! auth middlewares are applied per group rather than per handler.

pub mod admin;
pub mod articles;
pub mod auth;
pub mod forum;
pub mod middleware;
pub mod products;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    middleware as axum_middleware,
    routing::get,
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use middleware::{ApiError, AppState};

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    let admin_routes = Router::new()
        .nest("/admin", admin::router())
        .route_layer(axum_middleware::from_fn(middleware::require_admin))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    let protected_routes = Router::new()
        .nest("/auth", auth::protected_router())
        .nest("/articles", articles::protected_router())
        .nest("/products", products::protected_router())
        .nest("/forum", forum::protected_router())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth::public_router())
        .nest("/articles", articles::public_router())
        .nest("/products", products::public_router())
        .nest("/forum", forum::public_router())
        .merge(admin_routes)
        .merge(protected_routes)
}

/// Build the complete router with CORS and request tracing
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = match cors_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
            .allow_credentials(true),
        Err(_) => CorsLayer::new(),
    };

    Router::new()
        .nest("/api", build_api_router(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check: reports whether the database answers a ping
async fn health(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    match state.pool.ping().await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "status": "ok" }))),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "status": "unavailable" })),
            )
        }
    }
}
