//! Forum API endpoints
//!
//! - GET  /api/forum/threads
//! - POST /api/forum/threads (authenticated)
//! - GET  /api/forum/threads/{id}/replies
//! - POST /api/forum/threads/{id}/replies (authenticated)
//!
//! Reply routes 404 when the thread does not exist rather than creating
//! orphaned replies.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{
    CreateReplyInput, CreateThreadInput, ForumReply, ForumThread, ReplyWithAuthor, ThreadWithMeta,
};

/// Public forum routes
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/threads", get(list_threads))
        .route("/threads/{id}/replies", get(list_replies))
}

/// Protected forum routes (requires auth middleware)
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/threads", post(create_thread))
        .route("/threads/{id}/replies", post(create_reply))
}

/// GET /api/forum/threads
async fn list_threads(
    State(state): State<AppState>,
) -> Result<Json<Vec<ThreadWithMeta>>, ApiError> {
    let threads = state
        .forum_repo
        .list_threads()
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok(Json(threads))
}

/// POST /api/forum/threads
async fn create_thread(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<CreateThreadInput>,
) -> Result<impl IntoResponse, ApiError> {
    if body.title.trim().is_empty() {
        return Err(ApiError::validation_error("Title cannot be empty"));
    }
    if body.content.trim().is_empty() {
        return Err(ApiError::validation_error("Content cannot be empty"));
    }

    let thread = ForumThread {
        id: 0,
        title: body.title.trim().to_string(),
        content: body.content,
        author_id: Some(user.0.id),
        created_at: Utc::now(),
    };

    let created = state
        .forum_repo
        .create_thread(&thread)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/forum/threads/{id}/replies
async fn list_replies(
    State(state): State<AppState>,
    Path(thread_id): Path<i64>,
) -> Result<Json<Vec<ReplyWithAuthor>>, ApiError> {
    state
        .forum_repo
        .get_thread(thread_id)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Thread not found"))?;

    let replies = state
        .forum_repo
        .list_replies(thread_id)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok(Json(replies))
}

/// POST /api/forum/threads/{id}/replies
async fn create_reply(
    State(state): State<AppState>,
    Path(thread_id): Path<i64>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<CreateReplyInput>,
) -> Result<impl IntoResponse, ApiError> {
    if body.content.trim().is_empty() {
        return Err(ApiError::validation_error("Reply cannot be empty"));
    }

    state
        .forum_repo
        .get_thread(thread_id)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Thread not found"))?;

    let reply = ForumReply {
        id: 0,
        content: body.content,
        thread_id,
        author_id: Some(user.0.id),
        created_at: Utc::now(),
    };

    let created = state
        .forum_repo
        .create_reply(&reply)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok((StatusCode::CREATED, Json(created)))
}
