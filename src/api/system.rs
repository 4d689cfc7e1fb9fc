use axum::{Extension, Json, extract::State};
use std::sync::Arc;

use super::auth::require_admin;
use super::{ApiError, ApiResponse, AppState, SystemStatus};
use crate::services::AccessClaims;

/// GET /system/status
/// Admin only.
pub async fn get_status(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AccessClaims>,
) -> Result<Json<ApiResponse<SystemStatus>>, ApiError> {
    require_admin(&claims)?;

    let users = state.store.count_users().await?;
    let movies = state.store.count_movies().await?;
    let lists = state.store.count_lists().await?;

    Ok(Json(ApiResponse::success(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.start_time.elapsed().as_secs(),
        users,
        movies,
        lists,
    })))
}
