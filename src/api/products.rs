//! Product API endpoints
//!
//! - GET  /api/products
//! - POST /api/products (authenticated)

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{CreateProductInput, Product, ProductWithSeller};

/// Public product routes
pub fn public_router() -> Router<AppState> {
    Router::new().route("/", get(list_products))
}

/// Protected product routes (requires auth middleware)
pub fn protected_router() -> Router<AppState> {
    Router::new().route("/", post(create_product))
}

/// GET /api/products
async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductWithSeller>>, ApiError> {
    let products = state
        .product_repo
        .list()
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok(Json(products))
}

/// POST /api/products
async fn create_product(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<CreateProductInput>,
) -> Result<impl IntoResponse, ApiError> {
    if body.name.trim().is_empty() {
        return Err(ApiError::validation_error("Product name cannot be empty"));
    }
    if !body.price.is_finite() || body.price < 0.0 {
        return Err(ApiError::validation_error(
            "Price must be a non-negative number",
        ));
    }

    let product = Product {
        id: 0,
        name: body.name.trim().to_string(),
        description: body.description.filter(|d| !d.trim().is_empty()),
        price: body.price,
        image_url: body.image_url.filter(|u| !u.trim().is_empty()),
        seller_id: Some(user.0.id),
        created_at: Utc::now(),
    };

    let created = state
        .product_repo
        .create(&product)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok((StatusCode::CREATED, Json(created)))
}
