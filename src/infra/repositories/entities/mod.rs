//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.
//! Every decode into a domain type is lenient on stored enum labels.

pub mod abuse_report;
pub mod availability_exception;
pub mod conversation;
pub mod email_verification_token;
pub mod message;
pub mod notification;
pub mod password_reset_token;
pub mod tutor_profile;
pub mod tutoring_request;
pub mod user;
pub mod weekly_slot;
