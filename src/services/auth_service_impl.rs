//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tokio::task;

use crate::config::SecurityConfig;
use crate::db::repositories::user::{hash_password, verify_password};
use crate::db::{NewUser, Store, UserChanges};
use crate::services::auth_service::{
    AccountChanges, AccountProfile, AuthError, AuthService, LoginOutcome, NewAccount,
};
use crate::services::tokens::TokenAuthority;

pub struct SeaOrmAuthService {
    store: Store,
    tokens: TokenAuthority,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, tokens: TokenAuthority, security: SecurityConfig) -> Self {
        Self {
            store,
            tokens,
            security,
        }
    }

    /// Argon2 hashing is CPU-intensive and would stall the async runtime
    /// if run inline.
    async fn hash_blocking(&self, password: String) -> Result<String, AuthError> {
        let security = self.security.clone();

        task::spawn_blocking(move || hash_password(&password, Some(&security)))
            .await
            .map_err(|e| AuthError::Internal(format!("Hashing task panicked: {e}")))?
            .map_err(AuthError::from)
    }

    async fn verify_blocking(password: String, stored_hash: String) -> Result<bool, AuthError> {
        task::spawn_blocking(move || verify_password(&password, &stored_hash))
            .await
            .map_err(|e| AuthError::Internal(format!("Verification task panicked: {e}")))
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, new_account: NewAccount) -> Result<AccountProfile, AuthError> {
        if let Some(field) = self
            .store
            .user_identity_taken(&new_account.username, &new_account.email)
            .await?
        {
            return Err(AuthError::DuplicateIdentity(field));
        }

        let password_hash = self.hash_blocking(new_account.password).await?;

        let user = self
            .store
            .create_user(NewUser {
                username: new_account.username,
                email: new_account.email,
                password_hash,
                is_admin: new_account.is_admin,
                profile_picture: new_account.profile_picture,
            })
            .await?;

        tracing::info!("Registered account: {}", user.username);

        Ok(user.into())
    }

    async fn login(&self, identifier: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let user = self
            .store
            .get_user_by_identifier(identifier)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let is_valid =
            Self::verify_blocking(password.to_string(), user.password_hash.clone()).await?;

        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self
            .tokens
            .issue(user.id, user.is_admin)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(LoginOutcome {
            account: user.into(),
            access_token,
        })
    }

    async fn get_profile(&self, id: i32) -> Result<AccountProfile, AuthError> {
        let user = self
            .store
            .get_user(id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(user.into())
    }

    async fn update_account(
        &self,
        id: i32,
        changes: AccountChanges,
    ) -> Result<AccountProfile, AuthError> {
        let password_hash = match changes.password {
            Some(password) => Some(self.hash_blocking(password).await?),
            None => None,
        };

        let updated = self
            .store
            .update_user(
                id,
                UserChanges {
                    username: changes.username,
                    email: changes.email,
                    password_hash,
                    profile_picture: changes.profile_picture,
                    is_admin: changes.is_admin,
                },
            )
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(updated.into())
    }

    async fn delete_account(&self, id: i32) -> Result<(), AuthError> {
        let deleted = self.store.delete_user(id).await?;

        if !deleted {
            return Err(AuthError::UserNotFound);
        }

        tracing::info!("Deleted account: {id}");
        Ok(())
    }

    async fn list_accounts(&self, newest_only: bool) -> Result<Vec<AccountProfile>, AuthError> {
        let limit = if newest_only { Some(10) } else { None };
        let users = self.store.list_users(limit).await?;

        Ok(users.into_iter().map(AccountProfile::from).collect())
    }

    async fn registration_stats(
        &self,
    ) -> Result<Vec<crate::db::MonthlyRegistrations>, AuthError> {
        Ok(self.store.registrations_per_month().await?)
    }
}
