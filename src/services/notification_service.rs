//! In-app notification feed.
//!
//! Notifications are written by the matching and moderation flows; this
//! service only reads the feed and flips the read flag. Marking read is
//! scoped to the owner, so one user can never touch another's feed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Notification, NotificationKind};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;

/// A notification as returned by the API.
#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationView {
    pub id: Uuid,
    pub kind: NotificationKind,
    #[schema(example = "Nouvelle demande de tutorat")]
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationView {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.id,
            kind: notification.kind,
            title: notification.title,
            message: notification.message,
            read: notification.read,
            created_at: notification.created_at,
        }
    }
}

/// Notification service trait for dependency injection.
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// The user's notifications, newest first
    async fn list(&self, user_id: Uuid) -> AppResult<Vec<NotificationView>>;

    /// Mark one notification read. NotFound when it does not exist or
    /// belongs to someone else.
    async fn mark_read(&self, user_id: Uuid, notification_id: Uuid) -> AppResult<NotificationView>;
}

/// Concrete implementation of NotificationService using Unit of Work.
pub struct NotificationCenter<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> NotificationCenter<U> {
    /// Create new notification service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> NotificationService for NotificationCenter<U> {
    async fn list(&self, user_id: Uuid) -> AppResult<Vec<NotificationView>> {
        let notifications = self.uow.notifications().list_for_user(user_id).await?;
        Ok(notifications.into_iter().map(NotificationView::from).collect())
    }

    async fn mark_read(&self, user_id: Uuid, notification_id: Uuid) -> AppResult<NotificationView> {
        let notification = self
            .uow
            .notifications()
            .mark_read(notification_id, user_id)
            .await?;

        tracing::debug!(
            notification_id = %notification.id,
            user_id = %user_id,
            "Notification marked read"
        );

        Ok(NotificationView::from(notification))
    }
}
