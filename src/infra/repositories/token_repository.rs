//! Single-use account token repository (email verification, password reset).
//!
//! Tokens are opaque random strings with a server-side expiry. Issuing
//! a new token always purges the user's previous ones, so at most one
//! token per purpose is live at a time.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::entities::email_verification_token as verification;
use super::entities::password_reset_token as reset;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// A stored account token.
#[derive(Debug, Clone)]
pub struct AuthToken {
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

impl From<verification::Model> for AuthToken {
    fn from(model: verification::Model) -> Self {
        AuthToken {
            user_id: model.user_id,
            token: model.token,
            expires_at: model.expires_at,
        }
    }
}

impl From<reset::Model> for AuthToken {
    fn from(model: reset::Model) -> Self {
        AuthToken {
            user_id: model.user_id,
            token: model.token,
            expires_at: model.expires_at,
        }
    }
}

/// Token repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Store a fresh verification token, replacing any previous ones
    async fn issue_verification(
        &self,
        user_id: Uuid,
        token: String,
        expires_at: DateTime<Utc>,
    ) -> AppResult<AuthToken>;

    /// Look up a verification token by its opaque value
    async fn find_verification(&self, token: &str) -> AppResult<Option<AuthToken>>;

    /// Remove a verification token (consumed or expired)
    async fn delete_verification(&self, token: &str) -> AppResult<()>;

    /// Store a fresh reset token, replacing any previous ones
    async fn issue_reset(
        &self,
        user_id: Uuid,
        token: String,
        expires_at: DateTime<Utc>,
    ) -> AppResult<AuthToken>;

    /// Look up a reset token by its opaque value
    async fn find_reset(&self, token: &str) -> AppResult<Option<AuthToken>>;

    /// Remove a reset token (consumed or expired)
    async fn delete_reset(&self, token: &str) -> AppResult<()>;
}

/// Concrete implementation of TokenRepository
pub struct TokenStore {
    db: DatabaseConnection,
}

impl TokenStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TokenRepository for TokenStore {
    async fn issue_verification(
        &self,
        user_id: Uuid,
        token: String,
        expires_at: DateTime<Utc>,
    ) -> AppResult<AuthToken> {
        verification::Entity::delete_many()
            .filter(verification::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        let model = verification::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            token: Set(token),
            expires_at: Set(expires_at),
            created_at: Set(chrono::Utc::now()),
        }
        .insert(&self.db)
        .await
        .map_err(AppError::from)?;

        Ok(AuthToken::from(model))
    }

    async fn find_verification(&self, token: &str) -> AppResult<Option<AuthToken>> {
        let result = verification::Entity::find()
            .filter(verification::Column::Token.eq(token))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(AuthToken::from))
    }

    async fn delete_verification(&self, token: &str) -> AppResult<()> {
        verification::Entity::delete_many()
            .filter(verification::Column::Token.eq(token))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(())
    }

    async fn issue_reset(
        &self,
        user_id: Uuid,
        token: String,
        expires_at: DateTime<Utc>,
    ) -> AppResult<AuthToken> {
        reset::Entity::delete_many()
            .filter(reset::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        let model = reset::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            token: Set(token),
            expires_at: Set(expires_at),
            created_at: Set(chrono::Utc::now()),
        }
        .insert(&self.db)
        .await
        .map_err(AppError::from)?;

        Ok(AuthToken::from(model))
    }

    async fn find_reset(&self, token: &str) -> AppResult<Option<AuthToken>> {
        let result = reset::Entity::find()
            .filter(reset::Column::Token.eq(token))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(AuthToken::from))
    }

    async fn delete_reset(&self, token: &str) -> AppResult<()> {
        reset::Entity::delete_many()
            .filter(reset::Column::Token.eq(token))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(())
    }
}
