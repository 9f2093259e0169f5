//! User model
//!
//! A user row carries both the authenticated identity (email, password
//! hash) and the application profile (username, role). The two are
//! created together in a single insert, so a principal can never exist
//! without its profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User entity representing a registered member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Email address (unique)
    pub email: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// User role
    pub role: UserRole,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given parameters.
    ///
    /// The password must already be hashed; use
    /// `services::password::hash_password()`.
    pub fn new(username: String, email: String, password_hash: String, role: UserRole) -> Self {
        Self {
            id: 0, // Set by the database
            username,
            email,
            password_hash,
            role,
            created_at: Utc::now(),
        }
    }

    /// Check if the user is an administrator
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// User role for authorization.
///
/// Administrators can manage users and see platform statistics; regular
/// users can create content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular user (default)
    #[default]
    User,
    /// Administrator
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::User => write!(f, "user"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_new_defaults() {
        let user = User::new(
            "alice".to_string(),
            "a@x.com".to_string(),
            "hash".to_string(),
            UserRole::User,
        );

        assert_eq!(user.id, 0);
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.role, UserRole::User);
    }

    #[test]
    fn test_is_admin_follows_role() {
        let admin = User::new(
            "admin".to_string(),
            "admin@x.com".to_string(),
            "hash".to_string(),
            UserRole::Admin,
        );
        let user = User::new(
            "bob".to_string(),
            "bob@x.com".to_string(),
            "hash".to_string(),
            UserRole::User,
        );

        assert!(admin.is_admin());
        assert!(!user.is_admin());
    }

    #[test]
    fn test_role_display() {
        assert_eq!(UserRole::User.to_string(), "user");
        assert_eq!(UserRole::Admin.to_string(), "admin");
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!(UserRole::from_str("admin").unwrap(), UserRole::Admin);
        assert_eq!(UserRole::from_str("ADMIN").unwrap(), UserRole::Admin);
        assert_eq!(UserRole::from_str("user").unwrap(), UserRole::User);
        assert!(UserRole::from_str("moderator").is_err());
    }

    #[test]
    fn test_role_default_is_user() {
        assert_eq!(UserRole::default(), UserRole::User);
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new(
            "alice".to_string(),
            "a@x.com".to_string(),
            "secret-hash".to_string(),
            UserRole::User,
        );
        let json = serde_json::to_string(&user).expect("Failed to serialize user");
        assert!(!json.contains("secret-hash"));
    }
}
