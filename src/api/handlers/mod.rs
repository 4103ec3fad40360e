//! HTTP request handlers.

pub mod auth_handler;
pub mod matching_handler;
pub mod messaging_handler;
pub mod moderation_handler;
pub mod notification_handler;
pub mod tutorant_handler;

pub use auth_handler::{account_routes, auth_routes};
pub use matching_handler::matching_routes;
pub use messaging_handler::messaging_routes;
pub use moderation_handler::{report_routes, triage_routes};
pub use notification_handler::notification_routes;
pub use tutorant_handler::tutorant_routes;
