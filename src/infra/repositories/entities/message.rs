//! Message database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::Message;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "messages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub read: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for Message {
    fn from(model: Model) -> Self {
        Message {
            id: model.id,
            conversation_id: model.conversation_id,
            sender_id: model.sender_id,
            content: model.content,
            read: model.read,
            created_at: model.created_at,
        }
    }
}
