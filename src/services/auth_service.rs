//! Domain service for account registration, login, and profile management.
//!
//! Owns the credential workflow: hashing at registration, verification at
//! login, token issuance on success. Storage I/O goes through the `Store`;
//! plaintext passwords never leave this layer.

use serde::Serialize;
use thiserror::Error;

use crate::db::MonthlyRegistrations;

/// Errors specific to account operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown identity or wrong password. Deliberately carries no detail
    /// about which of the two failed.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0} is already registered")]
    DuplicateIdentity(&'static str),

    #[error("User not found")]
    UserNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Account DTO for responses; never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct AccountProfile {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub profile_picture: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<crate::entities::users::Model> for AccountProfile {
    fn from(model: crate::entities::users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            is_admin: model.is_admin,
            profile_picture: model.profile_picture,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// A new account to register. The public registration route always passes
/// `is_admin: false`; only the admin create-user route may set it.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub is_admin: bool,
    pub profile_picture: Option<String>,
}

/// Successful login: the sanitized account plus a fresh session token.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub account: AccountProfile,
    pub access_token: String,
}

/// Changes applied by a profile update. `None` fields are left untouched.
/// A `password` is re-hashed before storage.
#[derive(Debug, Default, Clone)]
pub struct AccountChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub profile_picture: Option<String>,
    pub is_admin: Option<bool>,
}

/// Domain service trait for authentication and account management.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Registers a new account with a freshly hashed credential.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DuplicateIdentity`] when the username or email
    /// is already registered.
    async fn register(&self, new_account: NewAccount) -> Result<AccountProfile, AuthError>;

    /// Verifies credentials and issues a session token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown identifier
    /// or a wrong password, without distinguishing the two.
    async fn login(&self, identifier: &str, password: &str) -> Result<LoginOutcome, AuthError>;

    /// Fetches a sanitized account by id.
    async fn get_profile(&self, id: i32) -> Result<AccountProfile, AuthError>;

    /// Applies profile changes, re-hashing the password when present.
    async fn update_account(
        &self,
        id: i32,
        changes: AccountChanges,
    ) -> Result<AccountProfile, AuthError>;

    /// Deletes an account.
    async fn delete_account(&self, id: i32) -> Result<(), AuthError>;

    /// All accounts, or only the 10 most recently registered.
    async fn list_accounts(&self, newest_only: bool) -> Result<Vec<AccountProfile>, AuthError>;

    /// Registrations grouped per calendar month.
    async fn registration_stats(&self) -> Result<Vec<MonthlyRegistrations>, AuthError>;
}
