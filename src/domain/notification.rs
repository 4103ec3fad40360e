//! In-app notifications emitted by the matching and moderation flows.
//!
//! Titles and bodies are product copy, in French, built here so every
//! emitter produces identical wording.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::slot::SlotRef;
use crate::domain::subject::Subject;
use crate::domain::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    NewRequest,
    RequestAccepted,
    BroadcastCall,
    AbuseReport,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::NewRequest => "NEW_REQUEST",
            NotificationKind::RequestAccepted => "REQUEST_ACCEPTED",
            NotificationKind::BroadcastCall => "BROADCAST_CALL",
            NotificationKind::AbuseReport => "ABUSE_REPORT",
        }
    }

    /// Lenient decode of a stored kind tag, defaulting to NewRequest.
    pub fn from_db(s: &str) -> Self {
        match s {
            "REQUEST_ACCEPTED" => NotificationKind::RequestAccepted,
            "BROADCAST_CALL" => NotificationKind::BroadcastCall,
            "ABUSE_REPORT" => NotificationKind::AbuseReport,
            _ => NotificationKind::NewRequest,
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Notification domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a notification, one constructor per kind.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl NewNotification {
    /// A tutor was targeted by a direct request.
    pub fn new_request(tutor_id: Uuid, student: &User, subject: Subject) -> Self {
        Self {
            user_id: tutor_id,
            kind: NotificationKind::NewRequest,
            title: "Nouvelle demande de tutorat".to_string(),
            message: format!("{} demande de l'aide en {}", student.full_name(), subject),
        }
    }

    /// A student's request was accepted by the tutor.
    pub fn request_accepted(student_id: Uuid, subject: Subject) -> Self {
        Self {
            user_id: student_id,
            kind: NotificationKind::RequestAccepted,
            title: "Demande acceptée".to_string(),
            message: format!("Votre demande de tutorat en {} a été acceptée", subject),
        }
    }

    /// A broadcast call reached this tutor.
    pub fn broadcast_call(tutor_id: Uuid, subject: Subject, slot: SlotRef) -> Self {
        Self {
            user_id: tutor_id,
            kind: NotificationKind::BroadcastCall,
            title: "Appel de tutorat".to_string(),
            message: format!(
                "Un étudiant recherche de l'aide en {} pour le créneau {}",
                subject, slot
            ),
        }
    }

    /// An abuse report landed; sent to every moderator.
    pub fn abuse_report(moderator_id: Uuid, reporter: &User) -> Self {
        Self {
            user_id: moderator_id,
            kind: NotificationKind::AbuseReport,
            title: "Nouveau signalement".to_string(),
            message: format!("Nouveau signalement de {}", reporter.full_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::level::ClassLevel;
    use crate::domain::slot::{TimeCode, Weekday};
    use crate::domain::user::UserRole;

    fn student() -> User {
        User {
            id: Uuid::new_v4(),
            email: "lucas@lycee.fr".into(),
            password_hash: "hash".into(),
            first_name: "Lucas".into(),
            last_name: "Bernard".into(),
            class_level: ClassLevel::Seconde,
            specialties: vec![],
            options: vec![],
            avatar_url: None,
            role: UserRole::Student,
            email_verified: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn direct_request_copy_names_the_student_and_subject() {
        let n = NewNotification::new_request(Uuid::new_v4(), &student(), Subject::Mathematiques);
        assert_eq!(n.title, "Nouvelle demande de tutorat");
        assert_eq!(n.message, "Lucas Bernard demande de l'aide en Mathématiques");
    }

    #[test]
    fn broadcast_copy_names_the_slot() {
        let slot = SlotRef::new(Weekday::Lundi, TimeCode::S3);
        let n = NewNotification::broadcast_call(Uuid::new_v4(), Subject::PhysiqueChimie, slot);
        assert_eq!(n.title, "Appel de tutorat");
        assert_eq!(
            n.message,
            "Un étudiant recherche de l'aide en Physique-Chimie pour le créneau Lundi_S3"
        );
    }

    #[test]
    fn kind_decode_defaults_to_new_request() {
        assert_eq!(
            NotificationKind::from_db("BROADCAST_CALL"),
            NotificationKind::BroadcastCall
        );
        assert_eq!(
            NotificationKind::from_db("whatever"),
            NotificationKind::NewRequest
        );
    }
}
