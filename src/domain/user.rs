//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{ROLE_MODERATOR, ROLE_STUDENT};
use crate::domain::level::ClassLevel;

/// User roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Student,
    Moderator,
}

impl UserRole {
    /// Check if this role has moderation privileges
    pub fn is_moderator(&self) -> bool {
        matches!(self, UserRole::Moderator)
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_MODERATOR => UserRole::Moderator,
            _ => UserRole::Student,
        }
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.to_string()
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Moderator => write!(f, "{}", ROLE_MODERATOR),
            UserRole::Student => write!(f, "{}", ROLE_STUDENT),
        }
    }
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub class_level: ClassLevel,
    /// Free-form specialty tags shown on the profile, e.g. "Maths", "NSI".
    pub specialties: Vec<String>,
    /// Elective options, same free-form convention as `specialties`.
    pub options: Vec<String>,
    pub avatar_url: Option<String>,
    pub role: UserRole,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Check if user has moderation privileges
    pub fn is_moderator(&self) -> bool {
        self.role.is_moderator()
    }
}

/// Insert payload for a user account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub class_level: ClassLevel,
    pub specialties: Vec<String>,
    pub options: Vec<String>,
    pub avatar_url: Option<String>,
    pub role: UserRole,
    pub email_verified: bool,
}

impl NewUser {
    /// Payload for self-service registration: student role, unverified.
    pub fn registration(
        email: String,
        password_hash: String,
        first_name: String,
        last_name: String,
        class_level: ClassLevel,
        specialties: Vec<String>,
        options: Vec<String>,
        avatar_url: Option<String>,
    ) -> Self {
        Self {
            email,
            password_hash,
            first_name,
            last_name,
            class_level,
            specialties,
            options,
            avatar_url,
            role: UserRole::Student,
            email_verified: false,
        }
    }
}

/// Compact public view of a user, embedded in match results and
/// conversation overviews. Never carries the email address.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserCard {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "Lucas")]
    pub first_name: String,
    #[schema(example = "Bernard")]
    pub last_name: String,
    pub avatar_url: Option<String>,
}

impl From<&User> for UserCard {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

impl From<User> for UserCard {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            avatar_url: user.avatar_url,
        }
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    /// User email address
    #[schema(example = "lucas@lycee.fr")]
    pub email: String,
    #[schema(example = "Lucas")]
    pub first_name: String,
    #[schema(example = "Bernard")]
    pub last_name: String,
    /// Class level as displayed to students
    #[schema(example = "2nde")]
    pub class_level: String,
    pub specialties: Vec<String>,
    pub options: Vec<String>,
    pub avatar_url: Option<String>,
    /// User role
    #[schema(example = "STUDENT")]
    pub role: String,
    pub email_verified: bool,
    /// Whether the user currently offers tutoring
    pub is_tutor_enabled: bool,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    /// The tutor flag lives on the tutoring profile, not the account,
    /// so callers must resolve it before building the response.
    pub fn new(user: User, is_tutor_enabled: bool) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            class_level: user.class_level.wire_label().to_string(),
            specialties: user.specialties,
            options: user.options,
            avatar_url: user.avatar_url,
            role: user.role.to_string(),
            email_verified: user.email_verified,
            is_tutor_enabled,
            created_at: user.created_at,
        }
    }
}
