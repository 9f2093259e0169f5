//! User service
//!
//! Registration, login, logout, and session validation. Registration is a
//! single write: the users row carries both credentials and profile fields,
//! so there is no window where an account exists without a profile.

use crate::db::repositories::{SessionRepository, UserRepository};
use crate::models::{Session, User, UserRole};
use crate::services::password::{hash_password, verify_password};
use anyhow::Context;
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Default session expiration time in days
const DEFAULT_SESSION_EXPIRATION_DAYS: i64 = 7;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Authentication failed (invalid credentials)
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// User already exists
    #[error("User already exists: {0}")]
    UserExists(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Input for user registration
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterInput {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Input for user login
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub username_or_email: String,
    pub password: String,
}

impl LoginInput {
    pub fn new(username_or_email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username_or_email: username_or_email.into(),
            password: password.into(),
        }
    }
}

/// User service for account management and authentication
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    session_expiration_days: i64,
}

impl UserService {
    /// Create a new user service with the given repositories
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            session_expiration_days: DEFAULT_SESSION_EXPIRATION_DAYS,
        }
    }

    /// Create a new user service with custom session expiration
    pub fn with_session_expiration(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        session_expiration_days: i64,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            session_expiration_days,
        }
    }

    /// Session lifetime in days, as configured at construction
    pub fn session_expiration_days(&self) -> i64 {
        self.session_expiration_days
    }

    /// Register a new user.
    ///
    /// The first account created in an empty database is granted the admin
    /// role so a fresh deployment always has an administrator.
    pub async fn register(&self, input: RegisterInput) -> Result<User, UserServiceError> {
        self.validate_register_input(&input)?;

        if self
            .user_repo
            .get_by_username(&input.username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(format!(
                "Username '{}' is already taken",
                input.username
            )));
        }

        if self
            .user_repo
            .get_by_email(&input.email)
            .await
            .context("Failed to check email")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(format!(
                "Email '{}' is already registered",
                input.email
            )));
        }

        let role = if self.is_first_user().await? {
            UserRole::Admin
        } else {
            UserRole::User
        };

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;
        let user = User::new(input.username, input.email, password_hash, role);

        let created = self
            .user_repo
            .create(&user)
            .await
            .context("Failed to create user")?;

        Ok(created)
    }

    /// Login with credentials, returning a fresh session on success.
    ///
    /// The error message never says whether the account exists.
    pub async fn login(&self, input: LoginInput) -> Result<Session, UserServiceError> {
        let user = self
            .find_user_by_username_or_email(&input.username_or_email)
            .await?
            .ok_or_else(|| {
                UserServiceError::AuthenticationError("Invalid username or password".to_string())
            })?;

        let password_valid = verify_password(&input.password, &user.password_hash)
            .context("Failed to verify password")?;

        if !password_valid {
            return Err(UserServiceError::AuthenticationError(
                "Invalid username or password".to_string(),
            ));
        }

        self.create_session(user.id).await
    }

    /// Logout (invalidate session). Unknown tokens are a no-op.
    pub async fn logout(&self, session_id: &str) -> Result<(), UserServiceError> {
        self.session_repo
            .delete(session_id)
            .await
            .context("Failed to delete session")?;

        Ok(())
    }

    /// Validate a session token and return the associated user.
    ///
    /// Expired sessions are deleted on sight and treated as absent.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>, UserServiceError> {
        let session = match self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to get session")?
        {
            Some(s) => s,
            None => return Ok(None),
        };

        if session.is_expired() {
            let _ = self.session_repo.delete(token).await;
            return Ok(None);
        }

        let user = self
            .user_repo
            .get_by_id(session.user_id)
            .await
            .context("Failed to get user")?;

        Ok(user)
    }

    /// Check whether the database has no users yet
    pub async fn is_first_user(&self) -> Result<bool, UserServiceError> {
        let count = self.user_repo.count().await.context("Failed to count users")?;
        Ok(count == 0)
    }

    /// Delete all expired sessions, returning how many were removed
    pub async fn cleanup_expired_sessions(&self) -> Result<i64, UserServiceError> {
        let count = self
            .session_repo
            .delete_expired()
            .await
            .context("Failed to delete expired sessions")?;

        Ok(count)
    }

    fn validate_register_input(&self, input: &RegisterInput) -> Result<(), UserServiceError> {
        if input.username.trim().is_empty() {
            return Err(UserServiceError::ValidationError(
                "Username cannot be empty".to_string(),
            ));
        }

        if input.email.trim().is_empty() {
            return Err(UserServiceError::ValidationError(
                "Email cannot be empty".to_string(),
            ));
        }

        if !input.email.contains('@') {
            return Err(UserServiceError::ValidationError(
                "Invalid email format".to_string(),
            ));
        }

        if input.password.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Password cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    async fn find_user_by_username_or_email(
        &self,
        username_or_email: &str,
    ) -> Result<Option<User>, UserServiceError> {
        if let Some(user) = self
            .user_repo
            .get_by_username(username_or_email)
            .await
            .context("Failed to get user by username")?
        {
            return Ok(Some(user));
        }

        let user = self
            .user_repo
            .get_by_email(username_or_email)
            .await
            .context("Failed to get user by email")?;

        Ok(user)
    }

    async fn create_session(&self, user_id: i64) -> Result<Session, UserServiceError> {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id,
            expires_at: now + Duration::days(self.session_expiration_days),
            created_at: now,
        };

        let created = self
            .session_repo
            .create(&session)
            .await
            .context("Failed to create session")?;

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxSessionRepository, SqlxUserRepository};
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_service() -> UserService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        UserService::new(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool),
        )
    }

    async fn setup_with_expiration(days: i64) -> UserService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        UserService::with_session_expiration(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool),
            days,
        )
    }

    #[tokio::test]
    async fn test_first_user_becomes_admin() {
        let service = setup_test_service().await;

        let user = service
            .register(RegisterInput::new("alice", "alice@example.com", "secret123"))
            .await
            .expect("Failed to register");

        assert_eq!(user.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn test_second_user_is_regular_user() {
        let service = setup_test_service().await;

        service
            .register(RegisterInput::new("alice", "alice@example.com", "secret123"))
            .await
            .expect("Failed to register first user");

        let second = service
            .register(RegisterInput::new("bob", "bob@example.com", "secret456"))
            .await
            .expect("Failed to register second user");

        assert_eq!(second.role, UserRole::User);
    }

    #[tokio::test]
    async fn test_register_stores_hashed_password() {
        let service = setup_test_service().await;

        let user = service
            .register(RegisterInput::new("alice", "alice@example.com", "secret123"))
            .await
            .expect("Failed to register");

        assert_ne!(user.password_hash, "secret123");
        assert!(user.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_register_duplicate_username_rejected() {
        let service = setup_test_service().await;

        service
            .register(RegisterInput::new("alice", "alice@example.com", "secret123"))
            .await
            .expect("Failed to register");

        let result = service
            .register(RegisterInput::new("alice", "other@example.com", "secret123"))
            .await;
        assert!(matches!(result, Err(UserServiceError::UserExists(_))));
    }

    #[tokio::test]
    async fn test_register_duplicate_email_rejected() {
        let service = setup_test_service().await;

        service
            .register(RegisterInput::new("alice", "alice@example.com", "secret123"))
            .await
            .expect("Failed to register");

        let result = service
            .register(RegisterInput::new("bob", "alice@example.com", "secret123"))
            .await;
        assert!(matches!(result, Err(UserServiceError::UserExists(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_input() {
        let service = setup_test_service().await;

        for (username, email, password) in [
            ("", "a@example.com", "secret123"),
            ("alice", "", "secret123"),
            ("alice", "not-an-email", "secret123"),
            ("alice", "a@example.com", ""),
        ] {
            let result = service
                .register(RegisterInput::new(username, email, password))
                .await;
            assert!(matches!(result, Err(UserServiceError::ValidationError(_))));
        }
    }

    #[tokio::test]
    async fn test_login_and_validate_roundtrip() {
        let service = setup_test_service().await;

        let registered = service
            .register(RegisterInput::new("alice", "alice@example.com", "secret123"))
            .await
            .expect("Failed to register");

        let session = service
            .login(LoginInput::new("alice", "secret123"))
            .await
            .expect("Failed to login");
        assert!(!session.is_expired());

        let user = service
            .validate_session(&session.id)
            .await
            .expect("Failed to validate session")
            .expect("Session should resolve to a user");
        assert_eq!(user.id, registered.id);
    }

    #[tokio::test]
    async fn test_login_with_email() {
        let service = setup_test_service().await;

        service
            .register(RegisterInput::new("alice", "alice@example.com", "secret123"))
            .await
            .expect("Failed to register");

        let session = service
            .login(LoginInput::new("alice@example.com", "secret123"))
            .await
            .expect("Failed to login");
        assert!(!session.id.is_empty());
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let service = setup_test_service().await;

        service
            .register(RegisterInput::new("alice", "alice@example.com", "secret123"))
            .await
            .expect("Failed to register");

        let wrong_password = service.login(LoginInput::new("alice", "wrong")).await;
        assert!(matches!(
            wrong_password,
            Err(UserServiceError::AuthenticationError(_))
        ));

        let unknown_user = service.login(LoginInput::new("mallory", "secret123")).await;
        assert!(matches!(
            unknown_user,
            Err(UserServiceError::AuthenticationError(_))
        ));
    }

    #[tokio::test]
    async fn test_logout_invalidates_session() {
        let service = setup_test_service().await;

        service
            .register(RegisterInput::new("alice", "alice@example.com", "secret123"))
            .await
            .expect("Failed to register");
        let session = service
            .login(LoginInput::new("alice", "secret123"))
            .await
            .expect("Failed to login");

        service.logout(&session.id).await.expect("Failed to logout");

        assert!(service
            .validate_session(&session.id)
            .await
            .expect("Failed to validate session")
            .is_none());
    }

    #[tokio::test]
    async fn test_logout_unknown_token_is_noop() {
        let service = setup_test_service().await;
        assert!(service.logout("no-such-token").await.is_ok());
    }

    #[tokio::test]
    async fn test_expired_session_rejected_and_removed() {
        let service = setup_with_expiration(-1).await;

        service
            .register(RegisterInput::new("alice", "alice@example.com", "secret123"))
            .await
            .expect("Failed to register");
        let session = service
            .login(LoginInput::new("alice", "secret123"))
            .await
            .expect("Failed to login");

        assert!(session.is_expired());
        assert!(service
            .validate_session(&session.id)
            .await
            .expect("Failed to validate session")
            .is_none());

        // Re-login issues a fresh, distinct token
        let fresh = service
            .login(LoginInput::new("alice", "secret123"))
            .await
            .expect("Failed to re-login");
        assert_ne!(fresh.id, session.id);
    }

    #[tokio::test]
    async fn test_multiple_concurrent_sessions() {
        let service = setup_test_service().await;

        service
            .register(RegisterInput::new("alice", "alice@example.com", "secret123"))
            .await
            .expect("Failed to register");

        let first = service
            .login(LoginInput::new("alice", "secret123"))
            .await
            .expect("Failed to login");
        let second = service
            .login(LoginInput::new("alice", "secret123"))
            .await
            .expect("Failed to login");

        assert_ne!(first.id, second.id);
        assert!(service.validate_session(&first.id).await.unwrap().is_some());
        assert!(service.validate_session(&second.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_cleanup_expired_sessions() {
        let service = setup_with_expiration(-1).await;

        service
            .register(RegisterInput::new("alice", "alice@example.com", "secret123"))
            .await
            .expect("Failed to register");
        service
            .login(LoginInput::new("alice", "secret123"))
            .await
            .expect("Failed to login");

        let removed = service
            .cleanup_expired_sessions()
            .await
            .expect("Failed to cleanup");
        assert_eq!(removed, 1);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::db::repositories::{SqlxSessionRepository, SqlxUserRepository};
    use crate::db::{create_test_pool, migrations};
    use proptest::prelude::*;

    async fn setup_service() -> UserService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        UserService::new(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool),
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(15))]

        /// Any valid credentials registered then logged in must validate
        /// back to the same account.
        #[test]
        fn auth_roundtrip(
            username in "[a-z]{3,12}",
            email_prefix in "[a-z]{3,12}",
            password in "[a-zA-Z0-9!@#%]{8,24}"
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let result: Result<(), TestCaseError> = rt.block_on(async {
                let service = setup_service().await;
                let email = format!("{}@example.com", email_prefix);

                let registered = service
                    .register(RegisterInput::new(username.clone(), email, password.clone()))
                    .await
                    .expect("Registration should succeed");

                let session = service
                    .login(LoginInput::new(username, password))
                    .await
                    .expect("Login should succeed");

                let validated = service
                    .validate_session(&session.id)
                    .await
                    .expect("Validation should not error")
                    .expect("Session should be valid");

                prop_assert_eq!(validated.id, registered.id);
                Ok(())
            });
            result?;
        }

        /// A password always verifies against its own hash and never
        /// against a different password's.
        #[test]
        fn password_hash_integrity(password in "[a-zA-Z0-9!@#%^&*]{1,40}") {
            let hash = hash_password(&password).expect("Hashing should succeed");

            prop_assert!(hash.starts_with("$argon2id$"));
            prop_assert_ne!(&hash, &password);
            prop_assert!(verify_password(&password, &hash).expect("Verification errored"));

            let wrong = format!("{}x", password);
            prop_assert!(!verify_password(&wrong, &hash).expect("Verification errored"));
        }

        /// Wrong passwords and unknown accounts are both rejected with an
        /// authentication error, indistinguishably.
        #[test]
        fn invalid_credentials_rejected(
            username in "[a-z]{3,12}",
            password in "[a-zA-Z0-9]{8,20}",
            wrong_password in "[a-zA-Z0-9]{8,20}"
        ) {
            prop_assume!(password != wrong_password);

            let rt = tokio::runtime::Runtime::new().unwrap();
            let result: Result<(), TestCaseError> = rt.block_on(async {
                let service = setup_service().await;
                let email = format!("{}@example.com", username);

                service
                    .register(RegisterInput::new(username.clone(), email, password.clone()))
                    .await
                    .expect("Registration should succeed");

                let bad_password = service
                    .login(LoginInput::new(username, wrong_password))
                    .await;
                prop_assert!(matches!(
                    bad_password,
                    Err(UserServiceError::AuthenticationError(_))
                ));

                let unknown = service
                    .login(LoginInput::new("nobody-here", password))
                    .await;
                prop_assert!(matches!(
                    unknown,
                    Err(UserServiceError::AuthenticationError(_))
                ));
                Ok(())
            });
            result?;
        }
    }
}
