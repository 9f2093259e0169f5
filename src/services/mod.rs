//! Business logic services

pub mod password;
pub mod user;

pub use user::{LoginInput, RegisterInput, UserService, UserServiceError};
