//! Data models
//!
//! Database entities and their input types: User, Session, Article,
//! Product, ForumThread, ForumReply.

mod article;
mod forum;
mod product;
mod session;
mod user;

pub use article::{Article, ArticleWithAuthor, CreateArticleInput};
pub use forum::{
    CreateReplyInput, CreateThreadInput, ForumReply, ForumThread, ReplyWithAuthor,
    ThreadWithMeta,
};
pub use product::{CreateProductInput, Product, ProductWithSeller};
pub use session::Session;
pub use user::{User, UserRole};
