use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::entities::{movies, prelude::*};

#[derive(Debug, Default, Clone)]
pub struct NewMovie {
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
}

/// Changes applied by a catalog update. `None` fields are left untouched.
#[derive(Debug, Default, Clone)]
pub struct MovieChanges {
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

pub struct MovieRepository {
    conn: DatabaseConnection,
}

impl MovieRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, new_movie: NewMovie) -> Result<movies::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = movies::ActiveModel {
            title: Set(new_movie.title),
            description: Set(new_movie.description),
            image: Set(new_movie.image),
            image_title: Set(new_movie.image_title),
            image_small: Set(new_movie.image_small),
            preview: Set(new_movie.preview),
            video: Set(new_movie.video),
            year: Set(new_movie.year),
            age_limit: Set(new_movie.age_limit),
            genre: Set(new_movie.genre),
            is_series: Set(new_movie.is_series),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert movie")
    }

    pub async fn get(&self, id: i32) -> Result<Option<movies::Model>> {
        Movies::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query movie by ID")
    }

    pub async fn title_taken(&self, title: &str) -> Result<bool> {
        let existing = Movies::find()
            .filter(movies::Column::Title.eq(title))
            .one(&self.conn)
            .await
            .context("Failed to check title uniqueness")?;

        Ok(existing.is_some())
    }

    pub async fn list(&self) -> Result<Vec<movies::Model>> {
        Movies::find()
            .order_by_asc(movies::Column::Title)
            .all(&self.conn)
            .await
            .context("Failed to list movies")
    }

    /// One uniformly random catalog entry, optionally filtered to
    /// series or standalone movies.
    pub async fn random(&self, is_series: Option<bool>) -> Result<Option<movies::Model>> {
        let mut query = Movies::find();

        if let Some(series) = is_series {
            query = query.filter(movies::Column::IsSeries.eq(series));
        }

        query
            .order_by(Expr::cust("RANDOM()"), Order::Asc)
            .one(&self.conn)
            .await
            .context("Failed to sample a random movie")
    }

    pub async fn update(&self, id: i32, changes: MovieChanges) -> Result<Option<movies::Model>> {
        let Some(movie) = Movies::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query movie for update")?
        else {
            return Ok(None);
        };

        let mut active: movies::ActiveModel = movie.into();

        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        if let Some(image) = changes.image {
            active.image = Set(Some(image));
        }
        if let Some(image_title) = changes.image_title {
            active.image_title = Set(Some(image_title));
        }
        if let Some(image_small) = changes.image_small {
            active.image_small = Set(Some(image_small));
        }
        if let Some(preview) = changes.preview {
            active.preview = Set(Some(preview));
        }
        if let Some(video) = changes.video {
            active.video = Set(Some(video));
        }
        if let Some(year) = changes.year {
            active.year = Set(Some(year));
        }
        if let Some(age_limit) = changes.age_limit {
            active.age_limit = Set(Some(age_limit));
        }
        if let Some(genre) = changes.genre {
            active.genre = Set(Some(genre));
        }
        if let Some(is_series) = changes.is_series {
            active.is_series = Set(is_series);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update movie")?;

        Ok(Some(updated))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Movies::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete movie")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count(&self) -> Result<u64> {
        Movies::find()
            .count(&self.conn)
            .await
            .context("Failed to count movies")
    }
}
