//! Abuse reports filed by students and triaged by moderators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;

/// Moderation triage states for a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    Open,
    Reviewing,
    Closed,
}

impl ReportStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportStatus::Open => "OPEN",
            ReportStatus::Reviewing => "REVIEWING",
            ReportStatus::Closed => "CLOSED",
        }
    }

    pub fn all() -> [ReportStatus; 3] {
        [
            ReportStatus::Open,
            ReportStatus::Reviewing,
            ReportStatus::Closed,
        ]
    }

    /// Lenient decode of a stored status, defaulting to Open.
    pub fn from_db(s: &str) -> Self {
        s.parse().unwrap_or(ReportStatus::Open)
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ReportStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportStatus::all()
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("Unknown report status: {}", s)))
    }
}

/// Abuse report domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbuseReport {
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub conversation_id: Option<Uuid>,
    pub message_id: Option<Uuid>,
    pub reason: String,
    pub description: String,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a report. At least one target must be set.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub conversation_id: Option<Uuid>,
    pub message_id: Option<Uuid>,
    pub reason: String,
    pub description: String,
}

impl NewReport {
    pub fn has_target(&self) -> bool {
        self.conversation_id.is_some() || self.message_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_decode_defaults_to_open() {
        assert_eq!(ReportStatus::from_db("REVIEWING"), ReportStatus::Reviewing);
        assert_eq!(ReportStatus::from_db("resolved"), ReportStatus::Open);
    }

    #[test]
    fn report_needs_a_conversation_or_message_target() {
        let bare = NewReport {
            conversation_id: None,
            message_id: None,
            reason: "spam".into(),
            description: "…".into(),
        };
        assert!(!bare.has_target());

        let targeted = NewReport {
            conversation_id: Some(Uuid::new_v4()),
            ..bare
        };
        assert!(targeted.has_target());
    }
}
