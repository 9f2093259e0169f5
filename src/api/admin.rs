//! Admin API endpoints
//!
//! - GET    /api/admin/users
//! - PUT    /api/admin/users/{id}/role
//! - DELETE /api/admin/users/{id}
//! - GET    /api/admin/stats
//!
//! All routes sit behind `require_auth` + `require_admin`. The stats
//! handler fans its four counts out concurrently instead of walking the
//! tables one by one.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, put},
    Extension, Json, Router,
};
use futures::try_join;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::api::auth::UserResponse;
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::UserRole;

/// Build the admin router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{id}/role", put(update_user_role))
        .route("/users/{id}", delete(delete_user))
        .route("/stats", get(get_stats))
}

/// Request body for updating a user's role
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

/// Response for platform-wide counts
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_users: i64,
    pub total_articles: i64,
    pub total_products: i64,
    pub total_threads: i64,
}

/// GET /api/admin/users
async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state
        .user_repo
        .list()
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// PUT /api/admin/users/{id}/role
async fn update_user_role(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateRoleRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let role = UserRole::from_str(&body.role)
        .map_err(|_| ApiError::validation_error(format!("Unknown role '{}'", body.role)))?;

    let updated = state
        .user_repo
        .update_role(id, role)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    if !updated {
        return Err(ApiError::not_found("User not found"));
    }

    let user = state
        .user_repo
        .get_by_id(id)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(user.into()))
}

/// DELETE /api/admin/users/{id}
///
/// Admins cannot delete their own account; content authored by the
/// deleted user survives with its author cleared.
async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(admin): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, ApiError> {
    if admin.0.id == id {
        return Err(ApiError::validation_error(
            "Admins cannot delete their own account",
        ));
    }

    let deleted = state
        .user_repo
        .delete(id)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    if !deleted {
        return Err(ApiError::not_found("User not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/admin/stats
async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let (total_users, total_articles, total_products, total_threads) = try_join!(
        state.user_repo.count(),
        state.article_repo.count(),
        state.product_repo.count(),
        state.forum_repo.count_threads(),
    )
    .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok(Json(StatsResponse {
        total_users,
        total_articles,
        total_products,
        total_threads,
    }))
}
