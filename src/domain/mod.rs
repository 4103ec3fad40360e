//! Domain layer - Core business entities and logic
//!
//! This module contains the core domain models that represent
//! business concepts independent of infrastructure concerns.
//!
//! DDD: Domain layer has NO external dependencies (except error types).
//! Contains: Entities, Value Objects, Domain Services (the eligibility
//! engine lives here as a pure function).

pub mod availability;
pub mod conversation;
pub mod level;
pub mod matching;
pub mod notification;
pub mod password;
pub mod profile;
pub mod report;
pub mod request;
pub mod slot;
pub mod subject;
pub mod user;

pub use availability::{AvailabilityException, NewException, WeekSchedule};
pub use conversation::{normalize_pair, sanitize_message, Conversation, Message};
pub use level::ClassLevel;
pub use matching::{filter_eligible, Candidate, MatchQuery};
pub use notification::{NewNotification, Notification, NotificationKind};
pub use password::Password;
pub use profile::{LevelSet, SubjectSet, TutorPreferences, TutorProfile};
pub use report::{AbuseReport, NewReport, ReportStatus};
pub use request::{NewRequest, RequestMode, RequestStatus, TutoringRequest};
pub use slot::{SlotRef, TimeCode, Weekday};
pub use subject::Subject;
pub use user::{NewUser, User, UserCard, UserResponse, UserRole};
