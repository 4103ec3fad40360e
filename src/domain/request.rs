//! Tutoring requests: a student asking a tutor for one slot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::level::ClassLevel;
use crate::domain::slot::SlotRef;
use crate::domain::subject::Subject;
use crate::errors::AppError;

/// Request lifecycle states.
///
/// The engine does not enforce a strict transition graph; it only
/// checks that the designated tutor is the one issuing the change.
/// Honored and Cancelled are recorded after the fact by the clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
    Honored,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Accepted => "ACCEPTED",
            RequestStatus::Rejected => "REJECTED",
            RequestStatus::Honored => "HONORED",
            RequestStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn all() -> [RequestStatus; 5] {
        [
            RequestStatus::Pending,
            RequestStatus::Accepted,
            RequestStatus::Rejected,
            RequestStatus::Honored,
            RequestStatus::Cancelled,
        ]
    }

    /// Lenient decode of a stored status, defaulting to Pending.
    pub fn from_db(s: &str) -> Self {
        s.parse().unwrap_or(RequestStatus::Pending)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RequestStatus::all()
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("Unknown request status: {}", s)))
    }
}

/// Which side of a request listing the caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// Requests the caller sent as a student.
    Tutore,
    /// Requests addressed to the caller as a tutor.
    Tutorant,
}

impl std::str::FromStr for RequestMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tutore" => Ok(RequestMode::Tutore),
            "tutorant" => Ok(RequestMode::Tutorant),
            other => Err(AppError::validation(format!(
                "Unknown request mode: {}",
                other
            ))),
        }
    }
}

/// Tutoring request domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutoringRequest {
    pub id: Uuid,
    pub student_id: Uuid,
    pub tutor_id: Uuid,
    pub subject: Subject,
    /// The level the student asked to be tutored at.
    pub level: ClassLevel,
    pub slot: SlotRef,
    /// Concrete session date the slot refers to.
    pub date: DateTime<Utc>,
    pub status: RequestStatus,
    /// True when the row came from a broadcast call fan-out.
    pub is_broadcast: bool,
    pub conversation_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a request row.
#[derive(Debug, Clone)]
pub struct NewRequest {
    pub student_id: Uuid,
    pub tutor_id: Uuid,
    pub subject: Subject,
    pub level: ClassLevel,
    pub slot: SlotRef,
    pub date: DateTime<Utc>,
    pub is_broadcast: bool,
    pub conversation_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_decode_defaults_to_pending() {
        assert_eq!(RequestStatus::from_db("ACCEPTED"), RequestStatus::Accepted);
        assert_eq!(RequestStatus::from_db("archived"), RequestStatus::Pending);
    }

    #[test]
    fn strict_status_parse_rejects_unknown_values() {
        assert!("PENDING".parse::<RequestStatus>().is_ok());
        assert!("pending".parse::<RequestStatus>().is_err());
        assert!("DONE".parse::<RequestStatus>().is_err());
    }

    #[test]
    fn mode_parses_the_two_listing_sides() {
        assert_eq!("tutore".parse::<RequestMode>().unwrap(), RequestMode::Tutore);
        assert_eq!(
            "tutorant".parse::<RequestMode>().unwrap(),
            RequestMode::Tutorant
        );
        assert!("both".parse::<RequestMode>().is_err());
    }
}
