//! Conversation database entity for SeaORM.
//!
//! The participant pair is stored normalized (lo < hi) and carries a
//! unique index, which is what makes lookup-or-create race-free.

use sea_orm::entity::prelude::*;

use crate::domain::Conversation;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "conversations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub participant_lo: Uuid,
    pub participant_hi: Uuid,
    pub request_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for Conversation {
    fn from(model: Model) -> Self {
        Conversation {
            id: model.id,
            participant_lo: model.participant_lo,
            participant_hi: model.participant_hi,
            request_id: model.request_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
