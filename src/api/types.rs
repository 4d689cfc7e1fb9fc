use serde::{Deserialize, Serialize};

use crate::db::ListWithContent;
use crate::entities::{lists, movies};
use crate::services::AccountProfile;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Sanitized account representation; the password hash never crosses
/// the API boundary.
#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub profile_picture: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<AccountProfile> for UserDto {
    fn from(profile: AccountProfile) -> Self {
        Self {
            id: profile.id,
            username: profile.username,
            email: profile.email,
            is_admin: profile.is_admin,
            profile_picture: profile.profile_picture,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserDto,
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct MovieDto {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub image_title: Option<String>,
    pub image_small: Option<String>,
    pub preview: Option<String>,
    pub video: Option<String>,
    pub year: Option<String>,
    pub age_limit: Option<String>,
    pub genre: Option<String>,
    pub is_series: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<movies::Model> for MovieDto {
    fn from(model: movies::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            image: model.image,
            image_title: model.image_title,
            image_small: model.image_small,
            preview: model.preview,
            video: model.video,
            year: model.year,
            age_limit: model.age_limit,
            genre: model.genre,
            is_series: model.is_series,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListDto {
    pub id: i32,
    pub title: String,
    pub kind: Option<String>,
    pub genre: Option<String>,
    /// Ordered movie ids.
    pub content: Vec<i32>,
    pub created_at: String,
    pub updated_at: String,
}

impl ListDto {
    #[must_use]
    pub fn from_parts(list: lists::Model, content: Vec<i32>) -> Self {
        Self {
            id: list.id,
            title: list.title,
            kind: list.kind,
            genre: list.genre,
            content,
            created_at: list.created_at,
            updated_at: list.updated_at,
        }
    }
}

impl From<ListWithContent> for ListDto {
    fn from(value: ListWithContent) -> Self {
        Self::from_parts(value.list, value.content)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateMovieRequest {
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub image_title: Option<String>,
    pub image_small: Option<String>,
    pub preview: Option<String>,
    pub video: Option<String>,
    pub year: Option<String>,
    pub age_limit: Option<String>,
    pub genre: Option<String>,
    #[serde(default)]
    pub is_series: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateMovieRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub image_title: Option<String>,
    pub image_small: Option<String>,
    pub preview: Option<String>,
    pub video: Option<String>,
    pub year: Option<String>,
    pub age_limit: Option<String>,
    pub genre: Option<String>,
    pub is_series: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreateListRequest {
    pub title: String,
    pub kind: Option<String>,
    pub genre: Option<String>,
    #[serde(default)]
    pub content: Vec<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateListRequest {
    pub title: Option<String>,
    pub kind: Option<String>,
    pub genre: Option<String>,
    pub content: Option<Vec<i32>>,
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime: u64,
    pub users: u64,
    pub movies: u64,
    pub lists: u64,
}
