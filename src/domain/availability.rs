//! Weekly availability grid and dated exceptions.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::slot::SlotRef;

/// The set of weekly grid slots a tutor has marked as free. Saving a
/// new schedule replaces the whole set.
pub type WeekSchedule = BTreeSet<SlotRef>;

/// A dated override of the weekly grid, e.g. "absent on the 14th".
///
/// Exceptions are informational: they are shown on the tutor's planning
/// but the matcher only consults the weekly grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityException {
    pub id: Uuid,
    pub user_id: Uuid,
    /// The day the exception applies to.
    pub date: DateTime<Utc>,
    /// False marks an absence, true marks extra availability.
    pub is_available: bool,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload for declaring a new exception.
#[derive(Debug, Clone, Deserialize)]
pub struct NewException {
    pub date: DateTime<Utc>,
    pub is_available: bool,
    pub reason: Option<String>,
}
