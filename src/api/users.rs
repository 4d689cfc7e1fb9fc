use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::{require_admin, require_self_or_admin};
use super::{ApiError, ApiResponse, AppState, UserDto};
use crate::db::MonthlyRegistrations;
use crate::services::{AccessClaims, AccountChanges, NewAccount};

#[derive(Deserialize)]
pub struct ListUsersQuery {
    /// `?new=true` returns only the 10 most recent registrations.
    #[serde(default)]
    pub new: bool,
}

#[derive(Default, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub profile_picture: Option<String>,
    pub is_admin: Option<bool>,
}

#[derive(Deserialize)]
pub struct AdminCreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
    pub profile_picture: Option<String>,
}

/// GET /users/find/{id}
/// Public profile fetch; the stored hash is stripped by the DTO.
pub async fn find_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let profile = state.auth.get_profile(id).await?;

    Ok(Json(ApiResponse::success(profile.into())))
}

/// PUT /users/{id}
/// Self or admin. A supplied password is re-hashed; the admin flag can
/// only be granted by an admin.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AccessClaims>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    require_self_or_admin(&claims, id)?;

    if payload.is_admin.is_some() && !claims.is_admin {
        return Err(ApiError::forbidden(
            "Only an admin can change the admin flag",
        ));
    }

    let updated = state
        .auth
        .update_account(
            id,
            AccountChanges {
                username: payload.username,
                email: payload.email,
                password: payload.password,
                profile_picture: payload.profile_picture,
                is_admin: payload.is_admin,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(updated.into())))
}

/// DELETE /users/{id}
/// Self or admin.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AccessClaims>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    require_self_or_admin(&claims, id)?;

    state.auth.delete_account(id).await?;

    Ok(Json(ApiResponse::success(
        "User has been deleted".to_string(),
    )))
}

/// GET /users
/// Admin only.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AccessClaims>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    require_admin(&claims)?;

    let users = state.auth.list_accounts(query.new).await?;

    Ok(Json(ApiResponse::success(
        users.into_iter().map(UserDto::from).collect(),
    )))
}

/// GET /users/stats
/// Admin only; registrations per calendar month.
pub async fn user_stats(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AccessClaims>,
) -> Result<Json<ApiResponse<Vec<MonthlyRegistrations>>>, ApiError> {
    require_admin(&claims)?;

    let stats = state.auth.registration_stats().await?;

    Ok(Json(ApiResponse::success(stats)))
}

/// POST /users
/// Admin creates an account directly, optionally another admin.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AccessClaims>,
    Json(payload): Json<AdminCreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&claims)?;

    if payload.username.is_empty() || payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation(
            "Username, email, and password are required",
        ));
    }

    let profile = state
        .auth
        .register(NewAccount {
            username: payload.username,
            email: payload.email,
            password: payload.password,
            is_admin: payload.is_admin,
            profile_picture: payload.profile_picture,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(UserDto::from(profile))),
    ))
}
