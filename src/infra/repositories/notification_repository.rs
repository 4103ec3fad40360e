//! Notification repository (read side plus read-marking).
//!
//! Notification inserts happen inside unit-of-work transactions; see
//! the transaction-aware stores in `infra::unit_of_work`.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use super::entities::notification::{self, ActiveModel, Entity as NotificationEntity};
use crate::domain::Notification;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Notification repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// The user's notifications, newest first
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Notification>>;

    /// Mark one notification read; scoped to its owner
    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> AppResult<Notification>;
}

/// Concrete implementation of NotificationRepository
pub struct NotificationStore {
    db: DatabaseConnection,
}

impl NotificationStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NotificationRepository for NotificationStore {
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Notification>> {
        let models = NotificationEntity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .order_by_desc(notification::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Notification::from).collect())
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> AppResult<Notification> {
        let found = NotificationEntity::find_by_id(id)
            .filter(notification::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = found.into();
        active.read = Set(true);

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(Notification::from(model))
    }
}
