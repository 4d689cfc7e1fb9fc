use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::{movies, users};

pub mod migrator;
pub mod repositories;

pub use repositories::list::{ListChanges, ListRepository, ListWithContent, NewList};
pub use repositories::movie::{MovieChanges, MovieRepository, NewMovie};
pub use repositories::user::{MonthlyRegistrations, NewUser, UserChanges, UserRepository};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        // An in-memory database exists per connection; clamp the pool to a
        // single shared connection so every query sees the migrated schema.
        let (max_connections, min_connections) = if db_url.starts_with("sqlite::memory:") {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        if !db_url.starts_with("sqlite::memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    pub fn user_repo(&self) -> UserRepository {
        UserRepository::new(self.conn.clone())
    }

    pub fn movie_repo(&self) -> MovieRepository {
        MovieRepository::new(self.conn.clone())
    }

    pub fn list_repo(&self) -> ListRepository {
        ListRepository::new(self.conn.clone())
    }

    // Users

    pub async fn create_user(&self, new_user: NewUser) -> Result<users::Model> {
        self.user_repo().create(new_user).await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<users::Model>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_identifier(&self, identifier: &str) -> Result<Option<users::Model>> {
        self.user_repo().get_by_identifier(identifier).await
    }

    pub async fn user_identity_taken(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<&'static str>> {
        self.user_repo().identity_taken(username, email).await
    }

    pub async fn list_users(&self, newest_limit: Option<u64>) -> Result<Vec<users::Model>> {
        self.user_repo().list(newest_limit).await
    }

    pub async fn update_user(&self, id: i32, changes: UserChanges) -> Result<Option<users::Model>> {
        self.user_repo().update(id, changes).await
    }

    pub async fn delete_user(&self, id: i32) -> Result<bool> {
        self.user_repo().delete(id).await
    }

    pub async fn count_users(&self) -> Result<u64> {
        self.user_repo().count().await
    }

    pub async fn registrations_per_month(&self) -> Result<Vec<MonthlyRegistrations>> {
        self.user_repo().registrations_per_month().await
    }

    // Movies

    pub async fn create_movie(&self, new_movie: NewMovie) -> Result<movies::Model> {
        self.movie_repo().create(new_movie).await
    }

    pub async fn get_movie(&self, id: i32) -> Result<Option<movies::Model>> {
        self.movie_repo().get(id).await
    }

    pub async fn movie_title_taken(&self, title: &str) -> Result<bool> {
        self.movie_repo().title_taken(title).await
    }

    pub async fn list_movies(&self) -> Result<Vec<movies::Model>> {
        self.movie_repo().list().await
    }

    pub async fn random_movie(&self, is_series: Option<bool>) -> Result<Option<movies::Model>> {
        self.movie_repo().random(is_series).await
    }

    pub async fn update_movie(
        &self,
        id: i32,
        changes: MovieChanges,
    ) -> Result<Option<movies::Model>> {
        self.movie_repo().update(id, changes).await
    }

    pub async fn delete_movie(&self, id: i32) -> Result<bool> {
        self.movie_repo().delete(id).await
    }

    pub async fn count_movies(&self) -> Result<u64> {
        self.movie_repo().count().await
    }

    // Lists

    pub async fn create_list(&self, new_list: NewList) -> Result<ListWithContent> {
        self.list_repo().create(new_list).await
    }

    pub async fn list_title_taken(&self, title: &str) -> Result<bool> {
        self.list_repo().title_taken(title).await
    }

    pub async fn get_list(&self, id: i32) -> Result<Option<ListWithContent>> {
        self.list_repo().get_with_content(id).await
    }

    pub async fn sample_lists(
        &self,
        kind: Option<&str>,
        genre: Option<&str>,
        limit: u64,
    ) -> Result<Vec<ListWithContent>> {
        self.list_repo().sample(kind, genre, limit).await
    }

    pub async fn update_list(&self, id: i32, changes: ListChanges) -> Result<Option<ListWithContent>> {
        self.list_repo().update(id, changes).await
    }

    pub async fn delete_list(&self, id: i32) -> Result<bool> {
        self.list_repo().delete(id).await
    }

    pub async fn count_lists(&self) -> Result<u64> {
        self.list_repo().count().await
    }
}
