//! Weekly availability slot database entity for SeaORM.
//!
//! One row per marked cell; day and time code are stored as separate
//! columns so the unique index covers the full (user, cell) triple.

use sea_orm::entity::prelude::*;

use crate::domain::{SlotRef, TimeCode, Weekday};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "weekly_slots")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub day: String,
    pub time_code: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain slot
impl From<Model> for SlotRef {
    fn from(model: Model) -> Self {
        SlotRef::new(
            Weekday::from_db(&model.day),
            TimeCode::from_db(&model.time_code),
        )
    }
}
