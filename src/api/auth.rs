//! Authentication API endpoints
//!
//! - POST /api/auth/register
//! - POST /api/auth/login
//! - POST /api/auth/logout
//! - GET  /api/auth/me
//!
//! Register and login both set an HttpOnly `session` cookie and return the
//! token in the body for clients that prefer the Authorization header.

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{extract_session_token, ApiError, AppState, AuthenticatedUser};
use crate::models::User;
use crate::services::{LoginInput, RegisterInput, UserServiceError};

/// Request body for user registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for user login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username_or_email: String,
    pub password: String,
}

/// Response for successful authentication
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

/// Response for user info
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub is_admin: bool,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let role = user.role.to_string();
        let is_admin = user.is_admin();
        let created_at = user.created_at.to_rfc3339();
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role,
            is_admin,
            created_at,
        }
    }
}

/// Public auth routes (no auth required)
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Protected auth routes (requires auth middleware)
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/logout", post(logout))
        .route("/me", get(get_current_user))
}

/// Build the session `Set-Cookie` header. The cookie lifetime follows
/// the server-side session expiry so the two can never diverge.
fn session_cookie(token: &str, expiration_days: i64) -> HeaderMap {
    let cookie = format!(
        "session={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        token,
        expiration_days * 24 * 60 * 60
    );

    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        headers.insert(header::SET_COOKIE, value);
    }
    headers
}

fn map_service_error(err: UserServiceError) -> ApiError {
    match err {
        UserServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        UserServiceError::UserExists(msg) => ApiError::conflict(msg),
        UserServiceError::AuthenticationError(msg) => ApiError::unauthorized(msg),
        UserServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
    }
}

/// POST /api/auth/register
///
/// Creates the account and logs it straight in, so the client never sees
/// a registered-but-unauthenticated state.
async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let password = body.password.clone();
    let input = RegisterInput::new(body.username, body.email, body.password);

    let user = state
        .user_service
        .register(input)
        .await
        .map_err(map_service_error)?;

    let session = state
        .user_service
        .login(LoginInput::new(&user.username, &password))
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        session_cookie(&session.id, state.user_service.session_expiration_days()),
        Json(AuthResponse {
            user: user.into(),
            token: session.id,
        }),
    ))
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = LoginInput::new(body.username_or_email, body.password);

    let session = state.user_service.login(input).await.map_err(|e| match e {
        UserServiceError::AuthenticationError(_) => {
            ApiError::unauthorized("Invalid username or password")
        }
        _ => ApiError::internal_error("Login failed"),
    })?;

    let user = state
        .user_service
        .validate_session(&session.id)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?
        .ok_or_else(|| ApiError::internal_error("Session validation failed"))?;

    Ok((
        session_cookie(&session.id, state.user_service.session_expiration_days()),
        Json(AuthResponse {
            user: user.into(),
            token: session.id,
        }),
    ))
}

/// POST /api/auth/logout
async fn logout(
    State(state): State<AppState>,
    Extension(_user): Extension<AuthenticatedUser>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = extract_session_token(&headers)
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    state
        .user_service
        .logout(&token)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_static("session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"),
    );

    Ok((StatusCode::NO_CONTENT, response_headers))
}

/// GET /api/auth/me
async fn get_current_user(Extension(user): Extension<AuthenticatedUser>) -> Json<UserResponse> {
    Json(user.0.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;

    #[test]
    fn test_user_response_carries_all_fields() {
        let mut user = User::new(
            "alice".to_string(),
            "alice@example.com".to_string(),
            "hash".to_string(),
            UserRole::Admin,
        );
        user.id = 42;

        let response = UserResponse::from(user);
        assert_eq!(response.id, 42);
        assert_eq!(response.username, "alice");
        assert_eq!(response.email, "alice@example.com");
        assert_eq!(response.role, "admin");
        assert!(response.is_admin);
        assert!(!response.created_at.is_empty());
    }

    #[test]
    fn test_session_cookie_lifetime_matches_expiry() {
        let headers = session_cookie("token-abc", 3);
        let cookie = headers
            .get(header::SET_COOKIE)
            .expect("Missing Set-Cookie")
            .to_str()
            .unwrap();
        assert!(cookie.starts_with("session=token-abc"));
        assert!(cookie.contains("Max-Age=259200"));
        assert!(cookie.contains("HttpOnly"));
    }
}
