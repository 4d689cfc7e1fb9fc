use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, LoginResponse, UserDto};
use crate::services::{AccessClaims, NewAccount};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub profile_picture: Option<String>,
}

/// Login accepts either field; whichever is present is the identifier.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

// ============================================================================
// Authorization gate
// ============================================================================

/// Per-request verification gate for every protected route.
///
/// A missing header rejects with 401 before any handler logic runs; a
/// present-but-invalid token likewise rejects with 401. Only on success are
/// the decoded claims attached to the request for downstream handlers, and
/// the rejected branches return without ever invoking the rest of the
/// chain.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = bearer_token(request.headers()) else {
        return Err(ApiError::Unauthorized(
            "You are not authenticated".to_string(),
        ));
    };

    let claims = state.tokens.verify(&token).map_err(|rejection| {
        tracing::debug!("Token rejected: {rejection}");
        ApiError::Unauthorized("Token is not valid".to_string())
    })?;

    tracing::Span::current().record("user_id", claims.id);
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Extract the token from a bearer-style authorization header.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}

/// Admin-only actions: 403 for any non-admin identity.
pub fn require_admin(claims: &AccessClaims) -> Result<(), ApiError> {
    if claims.is_admin {
        Ok(())
    } else {
        Err(ApiError::forbidden("You are not allowed to do that"))
    }
}

/// Self-service actions: the caller must own the target account or be
/// an admin.
pub fn require_self_or_admin(claims: &AccessClaims, user_id: i32) -> Result<(), ApiError> {
    if claims.id == user_id || claims.is_admin {
        Ok(())
    } else {
        Err(ApiError::forbidden("You can only manage your own account"))
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
/// Create a new (non-admin) account.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if payload.email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let profile = state
        .auth
        .register(NewAccount {
            username: payload.username,
            email: payload.email,
            password: payload.password,
            is_admin: false,
            profile_picture: payload.profile_picture,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(UserDto::from(profile))),
    ))
}

/// POST /auth/login
/// Authenticate with username or email plus password; returns the
/// sanitized account and a session token on success.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let identifier = payload
        .username
        .or(payload.email)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::validation("Username or email is required"))?;

    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let outcome = state.auth.login(&identifier, &payload.password).await?;

    Ok(Json(ApiResponse::success(LoginResponse {
        user: outcome.account.into(),
        access_token: outcome.access_token,
    })))
}
