use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::entities::{list_movies, lists, prelude::*};

/// A list together with its ordered movie ids.
#[derive(Debug, Clone)]
pub struct ListWithContent {
    pub list: lists::Model,
    pub content: Vec<i32>,
}

#[derive(Debug, Default, Clone)]
pub struct NewList {
    pub title: String,
    pub kind: Option<String>,
    pub genre: Option<String>,
    pub content: Vec<i32>,
}

/// Changes applied by a list update. A `Some(content)` replaces the
/// membership wholesale, preserving the given order.
#[derive(Debug, Default, Clone)]
pub struct ListChanges {
    pub title: Option<String>,
    pub kind: Option<String>,
    pub genre: Option<String>,
    pub content: Option<Vec<i32>>,
}

pub struct ListRepository {
    conn: DatabaseConnection,
}

impl ListRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, new_list: NewList) -> Result<ListWithContent> {
        let now = chrono::Utc::now().to_rfc3339();
        let txn = self.conn.begin().await?;

        let active = lists::ActiveModel {
            title: Set(new_list.title),
            kind: Set(new_list.kind),
            genre: Set(new_list.genre),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let list = active
            .insert(&txn)
            .await
            .context("Failed to insert list")?;

        for (position, movie_id) in new_list.content.iter().enumerate() {
            let row = list_movies::ActiveModel {
                list_id: Set(list.id),
                movie_id: Set(*movie_id),
                position: Set(i32::try_from(position).unwrap_or(i32::MAX)),
                ..Default::default()
            };
            row.insert(&txn)
                .await
                .context("Failed to insert list membership")?;
        }

        txn.commit().await?;

        Ok(ListWithContent {
            list,
            content: new_list.content,
        })
    }

    pub async fn title_taken(&self, title: &str) -> Result<bool> {
        let existing = Lists::find()
            .filter(lists::Column::Title.eq(title))
            .one(&self.conn)
            .await
            .context("Failed to check list title uniqueness")?;

        Ok(existing.is_some())
    }

    pub async fn get_with_content(&self, id: i32) -> Result<Option<ListWithContent>> {
        let Some(list) = Lists::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query list by ID")?
        else {
            return Ok(None);
        };

        let content = self.content_of(id).await?;

        Ok(Some(ListWithContent { list, content }))
    }

    async fn content_of(&self, list_id: i32) -> Result<Vec<i32>> {
        let rows = ListMovies::find()
            .filter(list_movies::Column::ListId.eq(list_id))
            .order_by_asc(list_movies::Column::Position)
            .all(&self.conn)
            .await
            .context("Failed to query list membership")?;

        Ok(rows.into_iter().map(|row| row.movie_id).collect())
    }

    /// Up to `limit` randomly sampled lists, optionally filtered by kind
    /// and genre.
    pub async fn sample(
        &self,
        kind: Option<&str>,
        genre: Option<&str>,
        limit: u64,
    ) -> Result<Vec<ListWithContent>> {
        let mut query = Lists::find();

        if let Some(kind) = kind {
            query = query.filter(lists::Column::Kind.eq(kind));
        }
        if let Some(genre) = genre {
            query = query.filter(lists::Column::Genre.eq(genre));
        }

        let lists = query
            .order_by(Expr::cust("RANDOM()"), Order::Asc)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to sample lists")?;

        let mut result = Vec::with_capacity(lists.len());
        for list in lists {
            let content = self.content_of(list.id).await?;
            result.push(ListWithContent { list, content });
        }

        Ok(result)
    }

    pub async fn update(&self, id: i32, changes: ListChanges) -> Result<Option<ListWithContent>> {
        let Some(list) = Lists::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query list for update")?
        else {
            return Ok(None);
        };

        let txn = self.conn.begin().await?;

        let mut active: lists::ActiveModel = list.into();

        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(kind) = changes.kind {
            active.kind = Set(Some(kind));
        }
        if let Some(genre) = changes.genre {
            active.genre = Set(Some(genre));
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let updated = active
            .update(&txn)
            .await
            .context("Failed to update list")?;

        if let Some(content) = &changes.content {
            ListMovies::delete_many()
                .filter(list_movies::Column::ListId.eq(id))
                .exec(&txn)
                .await
                .context("Failed to clear list membership")?;

            for (position, movie_id) in content.iter().enumerate() {
                let row = list_movies::ActiveModel {
                    list_id: Set(id),
                    movie_id: Set(*movie_id),
                    position: Set(i32::try_from(position).unwrap_or(i32::MAX)),
                    ..Default::default()
                };
                row.insert(&txn)
                    .await
                    .context("Failed to insert list membership")?;
            }
        }

        txn.commit().await?;

        let content = match changes.content {
            Some(content) => content,
            None => self.content_of(id).await?,
        };

        Ok(Some(ListWithContent {
            list: updated,
            content,
        }))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        ListMovies::delete_many()
            .filter(list_movies::Column::ListId.eq(id))
            .exec(&txn)
            .await
            .context("Failed to clear list membership")?;

        let result = Lists::delete_by_id(id)
            .exec(&txn)
            .await
            .context("Failed to delete list")?;

        txn.commit().await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count(&self) -> Result<u64> {
        Lists::find()
            .count(&self.conn)
            .await
            .context("Failed to count lists")
    }
}
