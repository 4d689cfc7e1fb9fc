use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, Statement,
};

use crate::config::SecurityConfig;
use crate::entities::{prelude::*, users};

/// Changes applied by a profile update. `None` fields are left untouched.
#[derive(Debug, Default, Clone)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub profile_picture: Option<String>,
    pub is_admin: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub profile_picture: Option<String>,
}

/// Registrations-per-month aggregation row.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MonthlyRegistrations {
    /// Two-digit month, "01" through "12"
    pub month: String,
    pub total: i64,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, new_user: NewUser) -> Result<users::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = users::ActiveModel {
            username: Set(new_user.username),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            is_admin: Set(new_user.is_admin),
            profile_picture: Set(new_user.profile_picture),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert user")
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<users::Model>> {
        Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")
    }

    /// Look up by username or email, whichever matches.
    pub async fn get_by_identifier(&self, identifier: &str) -> Result<Option<users::Model>> {
        Users::find()
            .filter(
                Condition::any()
                    .add(users::Column::Username.eq(identifier))
                    .add(users::Column::Email.eq(identifier)),
            )
            .one(&self.conn)
            .await
            .context("Failed to query user by identifier")
    }

    /// Returns the name of the conflicting column ("username" or "email"),
    /// if either value is already registered.
    pub async fn identity_taken(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<&'static str>> {
        let by_username = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to check username uniqueness")?;
        if by_username.is_some() {
            return Ok(Some("username"));
        }

        let by_email = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to check email uniqueness")?;
        if by_email.is_some() {
            return Ok(Some("email"));
        }

        Ok(None)
    }

    /// All users, or only the `limit` most recently registered.
    pub async fn list(&self, newest_limit: Option<u64>) -> Result<Vec<users::Model>> {
        let mut query = Users::find();

        if let Some(limit) = newest_limit {
            query = query
                .order_by_desc(users::Column::Id)
                .limit(limit);
        } else {
            query = query.order_by_asc(users::Column::Id);
        }

        query.all(&self.conn).await.context("Failed to list users")
    }

    pub async fn update(&self, id: i32, changes: UserChanges) -> Result<Option<users::Model>> {
        let Some(user) = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for update")?
        else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();

        if let Some(username) = changes.username {
            active.username = Set(username);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(password_hash) = changes.password_hash {
            active.password_hash = Set(password_hash);
        }
        if let Some(profile_picture) = changes.profile_picture {
            active.profile_picture = Set(Some(profile_picture));
        }
        if let Some(is_admin) = changes.is_admin {
            active.is_admin = Set(is_admin);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update user")?;

        Ok(Some(updated))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Users::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete user")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count(&self) -> Result<u64> {
        use sea_orm::PaginatorTrait;

        Users::find()
            .count(&self.conn)
            .await
            .context("Failed to count users")
    }

    /// Registrations grouped by calendar month of `created_at`.
    pub async fn registrations_per_month(&self) -> Result<Vec<MonthlyRegistrations>> {
        let backend = self.conn.get_database_backend();
        let rows = self
            .conn
            .query_all(Statement::from_string(
                backend,
                "SELECT strftime('%m', created_at) AS month, COUNT(*) AS total \
                 FROM users GROUP BY month ORDER BY month"
                    .to_string(),
            ))
            .await
            .context("Failed to aggregate registrations")?;

        rows.iter()
            .map(|row| {
                Ok(MonthlyRegistrations {
                    month: row.try_get("", "month")?,
                    total: row.try_get("", "total")?,
                })
            })
            .collect()
    }
}

/// Hash a password using Argon2id with the configured cost parameters.
/// If config is None, uses the argon2 crate defaults.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored PHC-format hash.
///
/// A malformed stored hash verifies false rather than erroring; the caller
/// learns nothing beyond the mismatch.
#[must_use]
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(stored_hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let hash = hash_password("correct horse", None).unwrap();
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn hashes_are_salted_per_call() {
        let first = hash_password("swordfish", None).unwrap();
        let second = hash_password("swordfish", None).unwrap();

        assert_ne!(first, second);
        assert!(verify_password("swordfish", &first));
        assert!(verify_password("swordfish", &second));
    }

    #[test]
    fn hash_never_contains_plaintext() {
        let hash = hash_password("hunter2", None).unwrap();
        assert!(!hash.contains("hunter2"));
    }

    #[test]
    fn malformed_stored_hash_verifies_false() {
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("anything", ""));
    }

    #[test]
    fn configured_costs_produce_verifiable_hashes() {
        let config = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        };
        let hash = hash_password("with-params", Some(&config)).unwrap();
        assert!(verify_password("with-params", &hash));
    }

    #[test]
    fn empty_plaintext_is_hashed_as_given() {
        let hash = hash_password("", None).unwrap();
        assert!(verify_password("", &hash));
        assert!(!verify_password("nonempty", &hash));
    }
}
