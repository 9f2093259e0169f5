//! InFarm - a community platform backend
//!
//! Articles, a discussion forum, a marketplace, and role-based
//! administration behind a JSON HTTP API.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
