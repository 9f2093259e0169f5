//! Product model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marketplace product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier
    pub id: i64,
    /// Product name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Price, non-negative
    pub price: f64,
    /// Optional image URL
    pub image_url: Option<String>,
    /// Seller user ID; None once the seller account is deleted
    pub seller_id: Option<i64>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Product joined with its seller's username, as returned by list queries.
#[derive(Debug, Clone, Serialize)]
pub struct ProductWithSeller {
    #[serde(flatten)]
    pub product: Product,
    /// Seller username; None once the seller account is deleted
    pub seller_username: Option<String>,
}

/// Input for creating a new product
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub image_url: Option<String>,
}
