//! Forum repository
//!
//! Database operations for discussion threads and replies. Thread listings
//! carry their reply counts via a correlated aggregate so the feed never
//! issues one count query per thread.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{ForumReply, ForumThread, ReplyWithAuthor, ThreadWithMeta};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Forum repository trait
#[async_trait]
pub trait ForumRepository: Send + Sync {
    /// Create a new thread
    async fn create_thread(&self, thread: &ForumThread) -> Result<ForumThread>;

    /// Get a thread by ID
    async fn get_thread(&self, id: i64) -> Result<Option<ForumThread>>;

    /// List all threads with author usernames and reply counts, newest first
    async fn list_threads(&self) -> Result<Vec<ThreadWithMeta>>;

    /// Count total threads
    async fn count_threads(&self) -> Result<i64>;

    /// Create a reply on a thread
    async fn create_reply(&self, reply: &ForumReply) -> Result<ForumReply>;

    /// List replies on a thread with author usernames, oldest first
    async fn list_replies(&self, thread_id: i64) -> Result<Vec<ReplyWithAuthor>>;
}

/// SQLx-based forum repository implementation
pub struct SqlxForumRepository {
    pool: DynDatabasePool,
}

impl SqlxForumRepository {
    /// Create a new SQLx forum repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ForumRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ForumRepository for SqlxForumRepository {
    async fn create_thread(&self, thread: &ForumThread) -> Result<ForumThread> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_thread_sqlite(self.pool.as_sqlite().unwrap(), thread).await
            }
            DatabaseDriver::Mysql => {
                create_thread_mysql(self.pool.as_mysql().unwrap(), thread).await
            }
        }
    }

    async fn get_thread(&self, id: i64) -> Result<Option<ForumThread>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_thread_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => get_thread_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list_threads(&self) -> Result<Vec<ThreadWithMeta>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_threads_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => list_threads_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn count_threads(&self) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => count_threads_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => count_threads_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn create_reply(&self, reply: &ForumReply) -> Result<ForumReply> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_reply_sqlite(self.pool.as_sqlite().unwrap(), reply).await
            }
            DatabaseDriver::Mysql => {
                create_reply_mysql(self.pool.as_mysql().unwrap(), reply).await
            }
        }
    }

    async fn list_replies(&self, thread_id: i64) -> Result<Vec<ReplyWithAuthor>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_replies_sqlite(self.pool.as_sqlite().unwrap(), thread_id).await
            }
            DatabaseDriver::Mysql => {
                list_replies_mysql(self.pool.as_mysql().unwrap(), thread_id).await
            }
        }
    }
}

const LIST_THREADS_QUERY: &str = r#"
    SELECT t.id, t.title, t.content, t.author_id, t.created_at,
           u.username AS author_username,
           (SELECT COUNT(*) FROM forum_replies r WHERE r.thread_id = t.id) AS reply_count
    FROM forum_threads t
    LEFT JOIN users u ON u.id = t.author_id
    ORDER BY t.created_at DESC, t.id DESC
"#;

const LIST_REPLIES_QUERY: &str = r#"
    SELECT r.id, r.content, r.thread_id, r.author_id, r.created_at,
           u.username AS author_username
    FROM forum_replies r
    LEFT JOIN users u ON u.id = r.author_id
    WHERE r.thread_id = ?
    ORDER BY r.created_at ASC, r.id ASC
"#;

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_thread_sqlite(pool: &SqlitePool, thread: &ForumThread) -> Result<ForumThread> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO forum_threads (title, content, author_id, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&thread.title)
    .bind(&thread.content)
    .bind(thread.author_id)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create thread")?;

    Ok(ForumThread {
        id: result.last_insert_rowid(),
        title: thread.title.clone(),
        content: thread.content.clone(),
        author_id: thread.author_id,
        created_at: now,
    })
}

async fn get_thread_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<ForumThread>> {
    let row = sqlx::query(
        "SELECT id, title, content, author_id, created_at FROM forum_threads WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get thread")?;

    row.map(|r| row_to_thread_sqlite(&r)).transpose()
}

async fn list_threads_sqlite(pool: &SqlitePool) -> Result<Vec<ThreadWithMeta>> {
    let rows = sqlx::query(LIST_THREADS_QUERY)
        .fetch_all(pool)
        .await
        .context("Failed to list threads")?;

    rows.iter().map(row_to_thread_meta_sqlite).collect()
}

async fn count_threads_sqlite(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM forum_threads")
        .fetch_one(pool)
        .await
        .context("Failed to count threads")?;

    Ok(count)
}

async fn create_reply_sqlite(pool: &SqlitePool, reply: &ForumReply) -> Result<ForumReply> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO forum_replies (content, thread_id, author_id, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&reply.content)
    .bind(reply.thread_id)
    .bind(reply.author_id)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create reply")?;

    Ok(ForumReply {
        id: result.last_insert_rowid(),
        content: reply.content.clone(),
        thread_id: reply.thread_id,
        author_id: reply.author_id,
        created_at: now,
    })
}

async fn list_replies_sqlite(pool: &SqlitePool, thread_id: i64) -> Result<Vec<ReplyWithAuthor>> {
    let rows = sqlx::query(LIST_REPLIES_QUERY)
        .bind(thread_id)
        .fetch_all(pool)
        .await
        .context("Failed to list replies")?;

    rows.iter().map(row_to_reply_sqlite).collect()
}

fn row_to_thread_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<ForumThread> {
    Ok(ForumThread {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        author_id: row.get("author_id"),
        created_at: row.get("created_at"),
    })
}

fn row_to_thread_meta_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<ThreadWithMeta> {
    Ok(ThreadWithMeta {
        thread: row_to_thread_sqlite(row)?,
        author_username: row.get("author_username"),
        reply_count: row.get("reply_count"),
    })
}

fn row_to_reply_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<ReplyWithAuthor> {
    Ok(ReplyWithAuthor {
        reply: ForumReply {
            id: row.get("id"),
            content: row.get("content"),
            thread_id: row.get("thread_id"),
            author_id: row.get("author_id"),
            created_at: row.get("created_at"),
        },
        author_username: row.get("author_username"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_thread_mysql(pool: &MySqlPool, thread: &ForumThread) -> Result<ForumThread> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO forum_threads (title, content, author_id, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&thread.title)
    .bind(&thread.content)
    .bind(thread.author_id)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create thread")?;

    Ok(ForumThread {
        id: result.last_insert_id() as i64,
        title: thread.title.clone(),
        content: thread.content.clone(),
        author_id: thread.author_id,
        created_at: now,
    })
}

async fn get_thread_mysql(pool: &MySqlPool, id: i64) -> Result<Option<ForumThread>> {
    let row = sqlx::query(
        "SELECT id, title, content, author_id, created_at FROM forum_threads WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get thread")?;

    row.map(|r| row_to_thread_mysql(&r)).transpose()
}

async fn list_threads_mysql(pool: &MySqlPool) -> Result<Vec<ThreadWithMeta>> {
    let rows = sqlx::query(LIST_THREADS_QUERY)
        .fetch_all(pool)
        .await
        .context("Failed to list threads")?;

    rows.iter().map(row_to_thread_meta_mysql).collect()
}

async fn count_threads_mysql(pool: &MySqlPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM forum_threads")
        .fetch_one(pool)
        .await
        .context("Failed to count threads")?;

    Ok(count)
}

async fn create_reply_mysql(pool: &MySqlPool, reply: &ForumReply) -> Result<ForumReply> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO forum_replies (content, thread_id, author_id, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&reply.content)
    .bind(reply.thread_id)
    .bind(reply.author_id)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create reply")?;

    Ok(ForumReply {
        id: result.last_insert_id() as i64,
        content: reply.content.clone(),
        thread_id: reply.thread_id,
        author_id: reply.author_id,
        created_at: now,
    })
}

async fn list_replies_mysql(pool: &MySqlPool, thread_id: i64) -> Result<Vec<ReplyWithAuthor>> {
    let rows = sqlx::query(LIST_REPLIES_QUERY)
        .bind(thread_id)
        .fetch_all(pool)
        .await
        .context("Failed to list replies")?;

    rows.iter().map(row_to_reply_mysql).collect()
}

fn row_to_thread_mysql(row: &sqlx::mysql::MySqlRow) -> Result<ForumThread> {
    Ok(ForumThread {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        author_id: row.get("author_id"),
        created_at: row.get("created_at"),
    })
}

fn row_to_thread_meta_mysql(row: &sqlx::mysql::MySqlRow) -> Result<ThreadWithMeta> {
    Ok(ThreadWithMeta {
        thread: row_to_thread_mysql(row)?,
        author_username: row.get("author_username"),
        reply_count: row.get("reply_count"),
    })
}

fn row_to_reply_mysql(row: &sqlx::mysql::MySqlRow) -> Result<ReplyWithAuthor> {
    Ok(ReplyWithAuthor {
        reply: ForumReply {
            id: row.get("id"),
            content: row.get("content"),
            thread_id: row.get("thread_id"),
            author_id: row.get("author_id"),
            created_at: row.get("created_at"),
        },
        author_username: row.get("author_username"),
    })
}
