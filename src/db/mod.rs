//! Database layer
//!
//! Trait-based pool abstraction over SQLite (default, single-binary
//! deployment) and MySQL, plus code-based migrations and one repository
//! per entity.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool, DatabasePool, DynDatabasePool};
