//! Availability exception database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::AvailabilityException;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "availability_exceptions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: DateTimeUtc,
    pub is_available: bool,
    pub reason: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for AvailabilityException {
    fn from(model: Model) -> Self {
        AvailabilityException {
            id: model.id,
            user_id: model.user_id,
            date: model.date,
            is_available: model.is_available,
            reason: model.reason,
            created_at: model.created_at,
        }
    }
}
