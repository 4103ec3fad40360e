//! Tutoring profile database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{ClassLevel, Subject, TutorProfile};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tutor_profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    pub enabled: bool,
    /// JSON array of canonical subject names
    pub subjects: Json,
    /// JSON array of storage-form level labels
    pub levels: Json,
    pub available_outside_hours: bool,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn decode_labels(value: Json) -> Vec<String> {
    serde_json::from_value(value).unwrap_or_default()
}

/// Convert database model to domain entity
impl From<Model> for TutorProfile {
    fn from(model: Model) -> Self {
        TutorProfile {
            user_id: model.user_id,
            enabled: model.enabled,
            subjects: decode_labels(model.subjects)
                .iter()
                .map(|s| Subject::from_db(s))
                .collect(),
            levels: decode_labels(model.levels)
                .iter()
                .map(|s| ClassLevel::from_db(s))
                .collect(),
            available_outside_hours: model.available_outside_hours,
            updated_at: model.updated_at,
        }
    }
}
