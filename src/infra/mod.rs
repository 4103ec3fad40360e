//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections and repositories
//! - Outgoing email
//! - Unit of Work for transaction management

pub mod db;
pub mod mailer;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use mailer::Mailer;
pub use repositories::{
    AuthToken, ConversationRepository, ConversationStore, NotificationRepository,
    NotificationStore, ProfileRepository, ProfileStore, ReportRepository, ReportStore,
    RequestRepository, RequestStore, TokenRepository, TokenStore, UserRepository, UserStore,
};
pub use unit_of_work::{
    ConversationTx, NotificationTx, Persistence, ReportTx, RequestTx, TxContext, UnitOfWork,
};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{
    MockConversationRepository, MockNotificationRepository, MockProfileRepository,
    MockReportRepository, MockRequestRepository, MockTokenRepository, MockUserRepository,
};
