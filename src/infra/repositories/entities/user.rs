//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{ClassLevel, User, UserRole};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub class_level: String,
    /// JSON array of free-form specialty tags
    pub specialties: Json,
    /// JSON array of elective option tags
    pub options: Json,
    pub avatar_url: Option<String>,
    pub role: String,
    pub email_verified: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn decode_tags(value: Json) -> Vec<String> {
    serde_json::from_value(value).unwrap_or_default()
}

/// Convert database model to domain entity
impl From<Model> for User {
    fn from(model: Model) -> Self {
        User {
            id: model.id,
            email: model.email,
            password_hash: model.password_hash,
            first_name: model.first_name,
            last_name: model.last_name,
            class_level: ClassLevel::from_db(&model.class_level),
            specialties: decode_tags(model.specialties),
            options: decode_tags(model.options),
            avatar_url: model.avatar_url,
            role: UserRole::from(model.role.as_str()),
            email_verified: model.email_verified,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
