use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::require_admin;
use super::{ApiError, ApiResponse, AppState, CreateListRequest, ListDto, UpdateListRequest};
use crate::db::{ListChanges, NewList};
use crate::services::AccessClaims;

/// Lists come back in random order so the home screen rows rotate
/// between requests.
const SAMPLE_SIZE: u64 = 10;

#[derive(Deserialize)]
pub struct SampleListsQuery {
    pub kind: Option<String>,
    pub genre: Option<String>,
}

/// GET /lists?kind=&genre=
/// Up to 10 randomly sampled lists for any authenticated user.
pub async fn sample_lists(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SampleListsQuery>,
) -> Result<Json<ApiResponse<Vec<ListDto>>>, ApiError> {
    let lists = state
        .store
        .sample_lists(query.kind.as_deref(), query.genre.as_deref(), SAMPLE_SIZE)
        .await?;

    Ok(Json(ApiResponse::success(
        lists.into_iter().map(ListDto::from).collect(),
    )))
}

/// GET /lists/find/{id}
/// Admin only.
pub async fn get_list(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AccessClaims>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ListDto>>, ApiError> {
    require_admin(&claims)?;

    let list = state
        .store
        .get_list(id)
        .await?
        .ok_or_else(|| ApiError::not_found("List", id))?;

    Ok(Json(ApiResponse::success(list.into())))
}

/// POST /lists
/// Admin only.
pub async fn create_list(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AccessClaims>,
    Json(payload): Json<CreateListRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&claims)?;

    if payload.title.is_empty() {
        return Err(ApiError::validation("Title is required"));
    }

    if state.store.list_title_taken(&payload.title).await? {
        return Err(ApiError::Conflict(format!(
            "A list titled '{}' already exists",
            payload.title
        )));
    }

    let list = state
        .store
        .create_list(NewList {
            title: payload.title,
            kind: payload.kind,
            genre: payload.genre,
            content: payload.content,
        })
        .await?;

    tracing::info!("Created list: {}", list.list.title);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(ListDto::from(list))),
    ))
}

/// PUT /lists/{id}
/// Admin only. A supplied content array replaces the membership.
pub async fn update_list(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AccessClaims>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateListRequest>,
) -> Result<Json<ApiResponse<ListDto>>, ApiError> {
    require_admin(&claims)?;

    let updated = state
        .store
        .update_list(
            id,
            ListChanges {
                title: payload.title,
                kind: payload.kind,
                genre: payload.genre,
                content: payload.content,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("List", id))?;

    Ok(Json(ApiResponse::success(updated.into())))
}

/// DELETE /lists/{id}
/// Admin only.
pub async fn delete_list(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AccessClaims>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    require_admin(&claims)?;

    if !state.store.delete_list(id).await? {
        return Err(ApiError::not_found("List", id));
    }

    Ok(Json(ApiResponse::success(
        "List has been deleted".to_string(),
    )))
}
