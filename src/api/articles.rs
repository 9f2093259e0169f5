//! Article API endpoints
//!
//! - GET  /api/articles
//! - POST /api/articles (authenticated)

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{Article, ArticleWithAuthor, CreateArticleInput};

/// Public article routes
pub fn public_router() -> Router<AppState> {
    Router::new().route("/", get(list_articles))
}

/// Protected article routes (requires auth middleware)
pub fn protected_router() -> Router<AppState> {
    Router::new().route("/", post(create_article))
}

/// GET /api/articles
async fn list_articles(
    State(state): State<AppState>,
) -> Result<Json<Vec<ArticleWithAuthor>>, ApiError> {
    let articles = state
        .article_repo
        .list()
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok(Json(articles))
}

/// POST /api/articles
async fn create_article(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<CreateArticleInput>,
) -> Result<impl IntoResponse, ApiError> {
    if body.title.trim().is_empty() {
        return Err(ApiError::validation_error("Title cannot be empty"));
    }
    if body.content.trim().is_empty() {
        return Err(ApiError::validation_error("Content cannot be empty"));
    }

    let article = Article {
        id: 0,
        title: body.title.trim().to_string(),
        content: body.content,
        image_url: body.image_url.filter(|u| !u.trim().is_empty()),
        author_id: Some(user.0.id),
        created_at: Utc::now(),
    };

    let created = state
        .article_repo
        .create(&article)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok((StatusCode::CREATED, Json(created)))
}
