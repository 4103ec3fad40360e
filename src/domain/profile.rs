//! Tutoring profile: what a user offers as a tutor.
//!
//! The profile is separate from the account. A user always has an
//! account; the profile exists only once they opt into tutoring, and it
//! can be switched off without losing its settings.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::level::ClassLevel;
use crate::domain::subject::Subject;

pub type SubjectSet = BTreeSet<Subject>;
pub type LevelSet = BTreeSet<ClassLevel>;

/// Declarative tutoring offer attached to a user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorProfile {
    pub user_id: Uuid,
    /// Master switch: when false the user never appears in match results.
    pub enabled: bool,
    /// Subjects the tutor is willing to help with.
    pub subjects: SubjectSet,
    /// Class levels the tutor accepts students from.
    pub levels: LevelSet,
    /// Whether the tutor also takes sessions outside regular school hours.
    pub available_outside_hours: bool,
    pub updated_at: DateTime<Utc>,
}

impl TutorProfile {
    /// Profile for a user who never configured tutoring. Everything off.
    pub fn disabled(user_id: Uuid) -> Self {
        Self {
            user_id,
            enabled: false,
            subjects: SubjectSet::new(),
            levels: LevelSet::new(),
            available_outside_hours: false,
            updated_at: Utc::now(),
        }
    }

    /// True when the offer covers the given subject and student level.
    pub fn covers(&self, subject: Subject, level: ClassLevel) -> bool {
        self.subjects.contains(&subject) && self.levels.contains(&level)
    }
}

/// Preference payload saved when a user configures their tutoring offer.
#[derive(Debug, Clone, Deserialize)]
pub struct TutorPreferences {
    pub subjects: SubjectSet,
    pub levels: LevelSet,
    pub available_outside_hours: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_profile_covers_nothing() {
        let profile = TutorProfile::disabled(Uuid::new_v4());
        assert!(!profile.enabled);
        assert!(!profile.covers(Subject::Mathematiques, ClassLevel::Seconde));
    }

    #[test]
    fn covers_requires_both_subject_and_level() {
        let mut profile = TutorProfile::disabled(Uuid::new_v4());
        profile.subjects.insert(Subject::Mathematiques);
        profile.levels.insert(ClassLevel::Seconde);

        assert!(profile.covers(Subject::Mathematiques, ClassLevel::Seconde));
        assert!(!profile.covers(Subject::Anglais, ClassLevel::Seconde));
        assert!(!profile.covers(Subject::Mathematiques, ClassLevel::Premiere));
    }
}
