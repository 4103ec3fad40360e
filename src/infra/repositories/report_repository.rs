//! Abuse report repository.
//!
//! Filing a report happens inside a unit-of-work transaction together
//! with the moderator notifications; this repository covers the read
//! and triage side.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use uuid::Uuid;

use super::entities::abuse_report::{self, ActiveModel, Entity as ReportEntity};
use crate::domain::{AbuseReport, ReportStatus};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Report repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Every report, newest first
    async fn list(&self) -> AppResult<Vec<AbuseReport>>;

    /// Find report by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<AbuseReport>>;

    /// Move a report to a new triage status
    async fn set_status(&self, id: Uuid, status: ReportStatus) -> AppResult<AbuseReport>;
}

/// Concrete implementation of ReportRepository
pub struct ReportStore {
    db: DatabaseConnection,
}

impl ReportStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReportRepository for ReportStore {
    async fn list(&self) -> AppResult<Vec<AbuseReport>> {
        let models = ReportEntity::find()
            .order_by_desc(abuse_report::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(AbuseReport::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<AbuseReport>> {
        let result = ReportEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(AbuseReport::from))
    }

    async fn set_status(&self, id: Uuid, status: ReportStatus) -> AppResult<AbuseReport> {
        let found = ReportEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = found.into();
        active.status = Set(status.to_string());
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(AbuseReport::from(model))
    }
}
