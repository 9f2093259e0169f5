//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity.

pub mod article;
pub mod forum;
pub mod product;
pub mod session;
pub mod user;

pub use article::{ArticleRepository, SqlxArticleRepository};
pub use forum::{ForumRepository, SqlxForumRepository};
pub use product::{ProductRepository, SqlxProductRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use user::{SqlxUserRepository, UserRepository};
