//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

mod conversation_repository;
pub(crate) mod entities;
mod notification_repository;
mod profile_repository;
mod report_repository;
mod request_repository;
mod token_repository;
mod user_repository;

pub(crate) use conversation_repository::get_or_create_on;
pub use conversation_repository::{ConversationRepository, ConversationStore};
pub use notification_repository::{NotificationRepository, NotificationStore};
pub use profile_repository::{ProfileRepository, ProfileStore};
pub use report_repository::{ReportRepository, ReportStore};
pub use request_repository::{RequestRepository, RequestStore};
pub use token_repository::{AuthToken, TokenRepository, TokenStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use conversation_repository::MockConversationRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use notification_repository::MockNotificationRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use profile_repository::MockProfileRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use report_repository::MockReportRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use request_repository::MockRequestRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use token_repository::MockTokenRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
