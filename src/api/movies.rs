use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::require_admin;
use super::{ApiError, ApiResponse, AppState, CreateMovieRequest, MovieDto, UpdateMovieRequest};
use crate::db::{MovieChanges, NewMovie};
use crate::services::AccessClaims;

#[derive(Deserialize)]
pub struct RandomMovieQuery {
    /// "movie" or "series"; anything else is ignored.
    pub kind: Option<String>,
}

/// GET /movies/find/{id}
pub async fn find_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MovieDto>>, ApiError> {
    let movie = state
        .store
        .get_movie(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Movie", id))?;

    Ok(Json(ApiResponse::success(movie.into())))
}

/// GET /movies/random?kind=
/// One random catalog entry, optionally constrained to movies or series.
pub async fn random_movie(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RandomMovieQuery>,
) -> Result<Json<ApiResponse<MovieDto>>, ApiError> {
    let is_series = match query.kind.as_deref() {
        Some("series") => Some(true),
        Some("movie") => Some(false),
        _ => None,
    };

    let movie = state
        .store
        .random_movie(is_series)
        .await?
        .ok_or_else(|| ApiError::NotFound("The catalog is empty".to_string()))?;

    Ok(Json(ApiResponse::success(movie.into())))
}

/// GET /movies
/// Admin only, full catalog.
pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AccessClaims>,
) -> Result<Json<ApiResponse<Vec<MovieDto>>>, ApiError> {
    require_admin(&claims)?;

    let movies = state.store.list_movies().await?;

    Ok(Json(ApiResponse::success(
        movies.into_iter().map(MovieDto::from).collect(),
    )))
}

/// POST /movies
/// Admin only.
pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AccessClaims>,
    Json(payload): Json<CreateMovieRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&claims)?;

    if payload.title.is_empty() {
        return Err(ApiError::validation("Title is required"));
    }

    if state.store.movie_title_taken(&payload.title).await? {
        return Err(ApiError::Conflict(format!(
            "A movie titled '{}' already exists",
            payload.title
        )));
    }

    let movie = state
        .store
        .create_movie(NewMovie {
            title: payload.title,
            description: payload.description,
            image: payload.image,
            image_title: payload.image_title,
            image_small: payload.image_small,
            preview: payload.preview,
            video: payload.video,
            year: payload.year,
            age_limit: payload.age_limit,
            genre: payload.genre,
            is_series: payload.is_series,
        })
        .await?;

    tracing::info!("Added movie: {}", movie.title);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(MovieDto::from(movie))),
    ))
}

/// PUT /movies/{id}
/// Admin only.
pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AccessClaims>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateMovieRequest>,
) -> Result<Json<ApiResponse<MovieDto>>, ApiError> {
    require_admin(&claims)?;

    let updated = state
        .store
        .update_movie(
            id,
            MovieChanges {
                title: payload.title,
                description: payload.description,
                image: payload.image,
                image_title: payload.image_title,
                image_small: payload.image_small,
                preview: payload.preview,
                video: payload.video,
                year: payload.year,
                age_limit: payload.age_limit,
                genre: payload.genre,
                is_series: payload.is_series,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Movie", id))?;

    Ok(Json(ApiResponse::success(updated.into())))
}

/// DELETE /movies/{id}
/// Admin only.
pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AccessClaims>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    require_admin(&claims)?;

    if !state.store.delete_movie(id).await? {
        return Err(ApiError::not_found("Movie", id));
    }

    Ok(Json(ApiResponse::success(
        "Movie has been deleted".to_string(),
    )))
}
