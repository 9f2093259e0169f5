//! Product repository
//!
//! Database operations for marketplace listings.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Product, ProductWithSeller};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Product repository trait
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Create a new product listing
    async fn create(&self, product: &Product) -> Result<Product>;

    /// List all products with seller usernames, newest first
    async fn list(&self) -> Result<Vec<ProductWithSeller>>;

    /// Count total products
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based product repository implementation
pub struct SqlxProductRepository {
    pool: DynDatabasePool,
}

impl SqlxProductRepository {
    /// Create a new SQLx product repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ProductRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ProductRepository for SqlxProductRepository {
    async fn create(&self, product: &Product) -> Result<Product> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_sqlite(self.pool.as_sqlite().unwrap(), product).await
            }
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), product).await,
        }
    }

    async fn list(&self) -> Result<Vec<ProductWithSeller>> {
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
    SELECT p.id, p.name, p.description, p.price, p.image_url, p.seller_id, p.created_at,
           u.username AS seller_username
    FROM products p
    LEFT JOIN users u ON u.id = p.seller_id
    ORDER BY p.created_at DESC, p.id DESC
"#;

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_sqlite(pool: &SqlitePool, product: &Product) -> Result<Product> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO products (name, description, price, image_url, seller_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(&product.image_url)
    .bind(product.seller_id)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create product")?;

    Ok(Product {
        id: result.last_insert_rowid(),
        name: product.name.clone(),
        description: product.description.clone(),
        price: product.price,
        image_url: product.image_url.clone(),
        seller_id: product.seller_id,
        created_at: now,
    })
}

async fn list_sqlite(pool: &SqlitePool) -> Result<Vec<ProductWithSeller>> {
    let rows = sqlx::query(LIST_QUERY)
        .fetch_all(pool)
        .await
        .context("Failed to list products")?;

    rows.iter().map(row_to_product_sqlite).collect()
}

async fn count_sqlite(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await
        .context("Failed to count products")?;

    Ok(count)
}

fn row_to_product_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<ProductWithSeller> {
    Ok(ProductWithSeller {
        product: Product {
            id: row.get("id"),
            name: row.get("name"),
            description: row.get("description"),
            price: row.get("price"),
            image_url: row.get("image_url"),
            seller_id: row.get("seller_id"),
            created_at: row.get("created_at"),
        },
        seller_username: row.get("seller_username"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_mysql(pool: &MySqlPool, product: &Product) -> Result<Product> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO products (name, description, price, image_url, seller_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(&product.image_url)
    .bind(product.seller_id)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create product")?;

    Ok(Product {
        id: result.last_insert_id() as i64,
        name: product.name.clone(),
        description: product.description.clone(),
        price: product.price,
        image_url: product.image_url.clone(),
        seller_id: product.seller_id,
        created_at: now,
    })
}

async fn list_mysql(pool: &MySqlPool) -> Result<Vec<ProductWithSeller>> {
    let rows = sqlx::query(LIST_QUERY)
        .fetch_all(pool)
        .await
        .context("Failed to list products")?;

    rows.iter().map(row_to_product_mysql).collect()
}

async fn count_mysql(pool: &MySqlPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await
        .context("Failed to count products")?;

    Ok(count)
}

fn row_to_product_mysql(row: &sqlx::mysql::MySqlRow) -> Result<ProductWithSeller> {
    Ok(ProductWithSeller {
        product: Product {
            id: row.get("id"),
            name: row.get("name"),
            description: row.get("description"),
            price: row.get("price"),
            image_url: row.get("image_url"),
            seller_id: row.get("seller_id"),
            created_at: row.get("created_at"),
        },
        seller_username: row.get("seller_username"),
    })
}
