//! Tutoring request repository (read side).
//!
//! All request writes run inside unit-of-work transactions; see the
//! transaction-aware stores in `infra::unit_of_work`.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use super::entities::tutoring_request::{self, Entity as RequestEntity};
use crate::domain::TutoringRequest;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Request repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RequestRepository: Send + Sync {
    /// Find request by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<TutoringRequest>>;

    /// Requests the user sent, newest first
    async fn list_for_student(&self, user_id: Uuid) -> AppResult<Vec<TutoringRequest>>;

    /// Requests addressed to the user as tutor, newest first
    async fn list_for_tutor(&self, user_id: Uuid) -> AppResult<Vec<TutoringRequest>>;
}

/// Concrete implementation of RequestRepository
pub struct RequestStore {
    db: DatabaseConnection,
}

impl RequestStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RequestRepository for RequestStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<TutoringRequest>> {
        let result = RequestEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(TutoringRequest::from))
    }

    async fn list_for_student(&self, user_id: Uuid) -> AppResult<Vec<TutoringRequest>> {
        let models = RequestEntity::find()
            .filter(tutoring_request::Column::StudentId.eq(user_id))
            .order_by_desc(tutoring_request::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(TutoringRequest::from).collect())
    }

    async fn list_for_tutor(&self, user_id: Uuid) -> AppResult<Vec<TutoringRequest>> {
        let models = RequestEntity::find()
            .filter(tutoring_request::Column::TutorId.eq(user_id))
            .order_by_desc(tutoring_request::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(TutoringRequest::from).collect())
    }
}
