use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::require_admin;
use super::{ApiError, ApiResponse, AppState};
use crate::services::{AccessClaims, AssetKind, PresignedUrl};

#[derive(Deserialize)]
pub struct AssetQuery {
    /// Object key relative to the asset-kind prefix, e.g. `trailer.mp4`.
    pub key: String,
}

/// GET /assets/videos/upload-url?key=
/// Admin only.
pub async fn video_upload_url(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AccessClaims>,
    Query(query): Query<AssetQuery>,
) -> Result<Json<ApiResponse<PresignedUrl>>, ApiError> {
    require_admin(&claims)?;

    let presigned = state.assets.upload_url(AssetKind::Video, &query.key)?;
    Ok(Json(ApiResponse::success(presigned)))
}

/// GET /assets/videos/delete-url?key=
/// Admin only.
pub async fn video_delete_url(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AccessClaims>,
    Query(query): Query<AssetQuery>,
) -> Result<Json<ApiResponse<PresignedUrl>>, ApiError> {
    require_admin(&claims)?;

    let presigned = state.assets.delete_url(AssetKind::Video, &query.key)?;
    Ok(Json(ApiResponse::success(presigned)))
}

/// GET /assets/posters/upload-url?key=
/// Admin only.
pub async fn poster_upload_url(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AccessClaims>,
    Query(query): Query<AssetQuery>,
) -> Result<Json<ApiResponse<PresignedUrl>>, ApiError> {
    require_admin(&claims)?;

    let presigned = state.assets.upload_url(AssetKind::Poster, &query.key)?;
    Ok(Json(ApiResponse::success(presigned)))
}

/// GET /assets/posters/delete-url?key=
/// Admin only.
pub async fn poster_delete_url(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AccessClaims>,
    Query(query): Query<AssetQuery>,
) -> Result<Json<ApiResponse<PresignedUrl>>, ApiError> {
    require_admin(&claims)?;

    let presigned = state.assets.delete_url(AssetKind::Poster, &query.key)?;
    Ok(Json(ApiResponse::success(presigned)))
}

/// GET /assets/profile-images/upload-url?key=
/// Any authenticated user; the object lands under the caller's own id so
/// one user cannot overwrite another's image.
pub async fn profile_image_upload_url(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AccessClaims>,
    Query(query): Query<AssetQuery>,
) -> Result<Json<ApiResponse<PresignedUrl>>, ApiError> {
    let scoped_key = format!("{}/{}", claims.id, query.key);

    let presigned = state
        .assets
        .upload_url(AssetKind::ProfileImage, &scoped_key)?;
    Ok(Json(ApiResponse::success(presigned)))
}
