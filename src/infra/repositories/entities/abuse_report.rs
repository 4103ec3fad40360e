//! Abuse report database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{AbuseReport, ReportStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "abuse_reports")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub conversation_id: Option<Uuid>,
    pub message_id: Option<Uuid>,
    pub reason: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for AbuseReport {
    fn from(model: Model) -> Self {
        AbuseReport {
            id: model.id,
            reporter_id: model.reporter_id,
            conversation_id: model.conversation_id,
            message_id: model.message_id,
            reason: model.reason,
            description: model.description,
            status: ReportStatus::from_db(&model.status),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
