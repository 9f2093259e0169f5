//! API middleware
//!
//! Session-token authentication and role-based authorization, plus the
//! shared application state and the JSON error envelope every handler
//! returns on failure.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::repositories::{
    ArticleRepository, ForumRepository, ProductRepository, UserRepository,
};
use crate::models::{User, UserRole};
use crate::services::UserService;

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: crate::db::DynDatabasePool,
    pub user_service: Arc<UserService>,
    pub user_repo: Arc<dyn UserRepository>,
    pub article_repo: Arc<dyn ArticleRepository>,
    pub product_repo: Arc<dyn ProductRepository>,
    pub forum_repo: Arc<dyn ForumRepository>,
}

/// Authenticated user extracted from request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CONFLICT" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

/// Extract the session token from the Authorization header or cookie.
/// A Bearer token wins if both are present.
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    if let Some(cookie_header) = headers.get(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie_str.split(';') {
                let cookie = cookie.trim();
                if let Some(token) = cookie.strip_prefix("session=") {
                    return Some(token.to_string());
                }
            }
        }
    }

    None
}

/// Authentication middleware
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_session_token(request.headers())
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    let user = state
        .user_service
        .validate_session(&token)
        .await
        .map_err(|e| ApiError::internal_error(format!("Session validation failed: {}", e)))?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired session"))?;

    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

/// Admin authorization middleware; runs after `require_auth`
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if user.0.role != UserRole::Admin {
        return Err(ApiError::forbidden("Admin privileges required"));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_extract_token_from_bearer() {
        let headers = headers(&[(header::AUTHORIZATION, "Bearer token-123")]);
        assert_eq!(extract_session_token(&headers), Some("token-123".to_string()));
    }

    #[test]
    fn test_extract_token_from_cookie() {
        let headers = headers(&[(header::COOKIE, "theme=dark; session=token-456")]);
        assert_eq!(extract_session_token(&headers), Some("token-456".to_string()));
    }

    #[test]
    fn test_bearer_takes_priority_over_cookie() {
        let headers = headers(&[
            (header::AUTHORIZATION, "Bearer bearer-token"),
            (header::COOKIE, "session=cookie-token"),
        ]);
        assert_eq!(
            extract_session_token(&headers),
            Some("bearer-token".to_string())
        );
    }

    #[test]
    fn test_extract_token_absent() {
        assert!(extract_session_token(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_non_bearer_auth_scheme_ignored() {
        let headers = headers(&[(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")]);
        assert!(extract_session_token(&headers).is_none());
    }

    #[test]
    fn test_api_error_codes() {
        assert_eq!(ApiError::unauthorized("x").error.code, "UNAUTHORIZED");
        assert_eq!(ApiError::forbidden("x").error.code, "FORBIDDEN");
        assert_eq!(ApiError::not_found("x").error.code, "NOT_FOUND");
        assert_eq!(ApiError::conflict("x").error.code, "CONFLICT");
        assert_eq!(
            ApiError::validation_error("x").error.code,
            "VALIDATION_ERROR"
        );
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn user_with_role(role: UserRole) -> User {
        User {
            id: 1,
            username: "someone".to_string(),
            email: "someone@example.com".to_string(),
            password_hash: "hash".to_string(),
            role,
            created_at: Utc::now(),
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        /// Only the admin role passes the admin check, for any user data.
        #[test]
        fn only_admins_have_admin_access(is_admin in prop::bool::ANY) {
            let role = if is_admin { UserRole::Admin } else { UserRole::User };
            let user = user_with_role(role);
            prop_assert_eq!(user.is_admin(), is_admin);
        }
    }
}
