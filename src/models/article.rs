//! Article model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Article entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Unique identifier
    pub id: i64,
    /// Article title
    pub title: String,
    /// Free-text content
    pub content: String,
    /// Optional cover image URL
    pub image_url: Option<String>,
    /// Author user ID; None once the author account is deleted
    pub author_id: Option<i64>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Article joined with its author's username, as returned by list queries.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleWithAuthor {
    #[serde(flatten)]
    pub article: Article,
    /// Author username; None once the author account is deleted
    pub author_username: Option<String>,
}

/// Input for creating a new article
#[derive(Debug, Clone, Deserialize)]
pub struct CreateArticleInput {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
}
