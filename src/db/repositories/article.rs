//! Article repository
//!
//! Database operations for published articles. Listings join the authors
//! in so deleted accounts show up as an absent username rather than
//! breaking the feed.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Article, ArticleWithAuthor};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Article repository trait
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Create a new article
    async fn create(&self, article: &Article) -> Result<Article>;

    /// List all articles with author usernames, newest first
    async fn list(&self) -> Result<Vec<ArticleWithAuthor>>;

    /// Count total articles
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based article repository implementation
pub struct SqlxArticleRepository {
    pool: DynDatabasePool,
}

impl SqlxArticleRepository {
    /// Create a new SQLx article repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ArticleRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ArticleRepository for SqlxArticleRepository {
    async fn create(&self, article: &Article) -> Result<Article> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_sqlite(self.pool.as_sqlite().unwrap(), article).await
            }
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), article).await,
        }
    }

    async fn list(&self) -> Result<Vec<ArticleWithAuthor>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => list_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn count(&self) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => count_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => count_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }
}

const LIST_QUERY: &str = r#"
    SELECT a.id, a.title, a.content, a.image_url, a.author_id, a.created_at,
           u.username AS author_username
    FROM articles a
    LEFT JOIN users u ON u.id = a.author_id
    ORDER BY a.created_at DESC, a.id DESC
"#;

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_sqlite(pool: &SqlitePool, article: &Article) -> Result<Article> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO articles (title, content, image_url, author_id, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&article.title)
    .bind(&article.content)
    .bind(&article.image_url)
    .bind(article.author_id)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create article")?;

    Ok(Article {
        id: result.last_insert_rowid(),
        title: article.title.clone(),
        content: article.content.clone(),
        image_url: article.image_url.clone(),
        author_id: article.author_id,
        created_at: now,
    })
}

async fn list_sqlite(pool: &SqlitePool) -> Result<Vec<ArticleWithAuthor>> {
    let rows = sqlx::query(LIST_QUERY)
        .fetch_all(pool)
        .await
        .context("Failed to list articles")?;

    rows.iter().map(row_to_article_sqlite).collect()
}

async fn count_sqlite(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
        .fetch_one(pool)
        .await
        .context("Failed to count articles")?;

    Ok(count)
}

fn row_to_article_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<ArticleWithAuthor> {
    Ok(ArticleWithAuthor {
        article: Article {
            id: row.get("id"),
            title: row.get("title"),
            content: row.get("content"),
            image_url: row.get("image_url"),
            author_id: row.get("author_id"),
            created_at: row.get("created_at"),
        },
        author_username: row.get("author_username"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_mysql(pool: &MySqlPool, article: &Article) -> Result<Article> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO articles (title, content, image_url, author_id, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&article.title)
    .bind(&article.content)
    .bind(&article.image_url)
    .bind(article.author_id)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create article")?;

    Ok(Article {
        id: result.last_insert_id() as i64,
        title: article.title.clone(),
        content: article.content.clone(),
        image_url: article.image_url.clone(),
        author_id: article.author_id,
        created_at: now,
    })
}

async fn list_mysql(pool: &MySqlPool) -> Result<Vec<ArticleWithAuthor>> {
    let rows = sqlx::query(LIST_QUERY)
        .fetch_all(pool)
        .await
        .context("Failed to list articles")?;

    rows.iter().map(row_to_article_mysql).collect()
}

async fn count_mysql(pool: &MySqlPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
        .fetch_one(pool)
        .await
        .context("Failed to count articles")?;

    Ok(count)
}

fn row_to_article_mysql(row: &sqlx::mysql::MySqlRow) -> Result<ArticleWithAuthor> {
    Ok(ArticleWithAuthor {
        article: Article {
            id: row.get("id"),
            title: row.get("title"),
            content: row.get("content"),
            image_url: row.get("image_url"),
            author_id: row.get("author_id"),
            created_at: row.get("created_at"),
        },
        author_username: row.get("author_username"),
    })
}
