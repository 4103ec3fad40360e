//! Tutor eligibility engine.
//!
//! A pure filter over an assembled candidate pool. It performs no I/O
//! and no writes; repositories assemble the pool, services act on the
//! result. Keeping the predicate here makes every clause unit-testable
//! without a database.

use uuid::Uuid;

use crate::domain::availability::WeekSchedule;
use crate::domain::level::ClassLevel;
use crate::domain::profile::TutorProfile;
use crate::domain::slot::SlotRef;
use crate::domain::subject::Subject;
use crate::domain::user::{User, UserRole};

/// A pool member: account plus tutoring offer plus weekly grid.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub user: User,
    pub profile: TutorProfile,
    pub week: WeekSchedule,
}

/// What the requesting student is looking for.
#[derive(Debug, Clone, Copy)]
pub struct MatchQuery {
    pub subject: Subject,
    pub level: ClassLevel,
    pub slot: SlotRef,
}

/// A candidate passes iff all clauses hold:
///
/// 1. not the requester, `Student` role, offer enabled (the pool query
///    already applies these, but the filter re-checks so the guarantee
///    does not depend on who assembled the pool);
/// 2. the queried subject is among the candidate's subjects;
/// 3. the candidate's own class level is among the levels they declared
///    (a self-consistency check, not a data-integrity constraint);
/// 4. the candidate is at or above the queried level;
/// 5. the candidate's weekly grid contains the exact slot.
///
/// Pool order is preserved. An empty result is not an error at this
/// layer; callers decide what emptiness means.
pub fn filter_eligible<'a>(
    pool: &'a [Candidate],
    query: &MatchQuery,
    requester: Uuid,
) -> Vec<&'a Candidate> {
    pool.iter()
        .filter(|candidate| {
            candidate.user.id != requester
                && candidate.user.role == UserRole::Student
                && candidate.profile.enabled
                && candidate.profile.subjects.contains(&query.subject)
                && candidate.profile.levels.contains(&candidate.user.class_level)
                && candidate.user.class_level.rank() >= query.level.rank()
                && candidate.week.contains(&query.slot)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::profile::{LevelSet, SubjectSet};
    use crate::domain::slot::{TimeCode, Weekday};

    fn slot(day: Weekday, time: TimeCode) -> SlotRef {
        SlotRef::new(day, time)
    }

    fn candidate(level: ClassLevel) -> Candidate {
        let id = Uuid::new_v4();
        Candidate {
            user: User {
                id,
                email: format!("{}@lycee.fr", id),
                password_hash: "hash".into(),
                first_name: "Tutor".into(),
                last_name: "Test".into(),
                class_level: level,
                specialties: vec![],
                options: vec![],
                avatar_url: None,
                role: UserRole::Student,
                email_verified: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            profile: TutorProfile {
                user_id: id,
                enabled: true,
                subjects: SubjectSet::from([Subject::Mathematiques]),
                levels: LevelSet::from(ClassLevel::all()),
                available_outside_hours: false,
                updated_at: Utc::now(),
            },
            week: WeekSchedule::from([slot(Weekday::Lundi, TimeCode::S3)]),
        }
    }

    fn query() -> MatchQuery {
        MatchQuery {
            subject: Subject::Mathematiques,
            level: ClassLevel::Seconde,
            slot: slot(Weekday::Lundi, TimeCode::S3),
        }
    }

    #[test]
    fn eligible_candidate_passes() {
        let pool = vec![candidate(ClassLevel::Terminale)];
        assert_eq!(filter_eligible(&pool, &query(), Uuid::new_v4()).len(), 1);
    }

    #[test]
    fn excludes_the_requester() {
        let pool = vec![candidate(ClassLevel::Terminale)];
        let own_id = pool[0].user.id;
        assert!(filter_eligible(&pool, &query(), own_id).is_empty());
    }

    #[test]
    fn excludes_moderators_and_disabled_offers() {
        let mut moderator = candidate(ClassLevel::Terminale);
        moderator.user.role = UserRole::Moderator;
        let mut disabled = candidate(ClassLevel::Terminale);
        disabled.profile.enabled = false;

        let pool = vec![moderator, disabled];
        assert!(filter_eligible(&pool, &query(), Uuid::new_v4()).is_empty());
    }

    #[test]
    fn requires_subject_membership() {
        let mut other_subject = candidate(ClassLevel::Terminale);
        other_subject.profile.subjects = SubjectSet::from([Subject::Anglais]);

        let pool = vec![other_subject];
        assert!(filter_eligible(&pool, &query(), Uuid::new_v4()).is_empty());
    }

    #[test]
    fn requires_own_level_among_declared_levels() {
        let mut inconsistent = candidate(ClassLevel::Terminale);
        inconsistent.profile.levels = LevelSet::from([ClassLevel::Seconde]);

        let pool = vec![inconsistent];
        assert!(filter_eligible(&pool, &query(), Uuid::new_v4()).is_empty());
    }

    #[test]
    fn seniority_is_monotonic() {
        let terminale = candidate(ClassLevel::Terminale);
        let seconde = candidate(ClassLevel::Seconde);
        let pool = vec![terminale, seconde];

        for level in ClassLevel::all() {
            let q = MatchQuery { level, ..query() };
            let passing = filter_eligible(&pool, &q, Uuid::new_v4());
            // The Terminale tutor matches every level; the Seconde tutor
            // only matches Seconde requests.
            assert!(passing.iter().any(|c| c.user.id == pool[0].user.id));
            assert_eq!(
                passing.iter().any(|c| c.user.id == pool[1].user.id),
                level == ClassLevel::Seconde
            );
        }
    }

    #[test]
    fn requires_the_exact_slot() {
        let mut wrong_slot = candidate(ClassLevel::Terminale);
        wrong_slot.week = WeekSchedule::from([slot(Weekday::Mardi, TimeCode::M1)]);

        let pool = vec![wrong_slot];
        assert!(filter_eligible(&pool, &query(), Uuid::new_v4()).is_empty());
    }

    #[test]
    fn broadcast_scenario_keeps_only_the_available_senior_tutor() {
        // T1 is Terminale, teaches maths, free on Lundi_S3. T2 is
        // Premiere, teaches maths, but only free on Mardi_M1.
        let t1 = candidate(ClassLevel::Terminale);
        let mut t2 = candidate(ClassLevel::Premiere);
        t2.week = WeekSchedule::from([slot(Weekday::Mardi, TimeCode::M1)]);

        let pool = vec![t1, t2];
        let passing = filter_eligible(&pool, &query(), Uuid::new_v4());
        assert_eq!(passing.len(), 1);
        assert_eq!(passing[0].user.id, pool[0].user.id);
    }

    #[test]
    fn pool_order_is_preserved() {
        let a = candidate(ClassLevel::Terminale);
        let b = candidate(ClassLevel::Terminale);
        let pool = vec![a, b];

        let passing = filter_eligible(&pool, &query(), Uuid::new_v4());
        let ids: Vec<Uuid> = passing.iter().map(|c| c.user.id).collect();
        assert_eq!(ids, vec![pool[0].user.id, pool[1].user.id]);
    }
}
