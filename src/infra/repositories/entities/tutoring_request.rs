//! Tutoring request database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{ClassLevel, RequestStatus, SlotRef, Subject, TutoringRequest};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tutoring_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub student_id: Uuid,
    pub tutor_id: Uuid,
    pub subject: String,
    pub level: String,
    /// Combined slot id, e.g. "Lundi_S3"
    pub slot_id: String,
    pub date: DateTimeUtc,
    pub status: String,
    pub is_broadcast: bool,
    pub conversation_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for TutoringRequest {
    fn from(model: Model) -> Self {
        TutoringRequest {
            id: model.id,
            student_id: model.student_id,
            tutor_id: model.tutor_id,
            subject: Subject::from_db(&model.subject),
            level: ClassLevel::from_db(&model.level),
            slot: SlotRef::from_db(&model.slot_id),
            date: model.date,
            status: RequestStatus::from_db(&model.status),
            is_broadcast: model.is_broadcast,
            conversation_id: model.conversation_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
