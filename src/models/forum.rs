//! Forum models
//!
//! A thread's reply count is computed by the list query, never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Discussion thread entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForumThread {
    /// Unique identifier
    pub id: i64,
    /// Thread title
    pub title: String,
    /// Opening post content
    pub content: String,
    /// Author user ID; None once the author account is deleted
    pub author_id: Option<i64>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Thread joined with its author's username and computed reply count.
#[derive(Debug, Clone, Serialize)]
pub struct ThreadWithMeta {
    #[serde(flatten)]
    pub thread: ForumThread,
    /// Author username; None once the author account is deleted
    pub author_username: Option<String>,
    /// Number of replies, computed on read
    pub reply_count: i64,
}

/// Reply entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForumReply {
    /// Unique identifier
    pub id: i64,
    /// Reply content
    pub content: String,
    /// Parent thread ID
    pub thread_id: i64,
    /// Author user ID; None once the author account is deleted
    pub author_id: Option<i64>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Reply joined with its author's username.
#[derive(Debug, Clone, Serialize)]
pub struct ReplyWithAuthor {
    #[serde(flatten)]
    pub reply: ForumReply,
    /// Author username; None once the author account is deleted
    pub author_username: Option<String>,
}

/// Input for creating a new thread
#[derive(Debug, Clone, Deserialize)]
pub struct CreateThreadInput {
    pub title: String,
    pub content: String,
}

/// Input for replying to a thread
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReplyInput {
    pub content: String,
}
