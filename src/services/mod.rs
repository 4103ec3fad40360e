//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.
//!
//! All services use Unit of Work pattern for centralized repository
//! access and transaction management.

mod auth_service;
pub mod container;
mod matching_service;
mod messaging_service;
mod moderation_service;
mod notification_service;
mod profile_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{
    AuthService, AuthSession, Authenticator, Claims, RegisterInput, TokenResponse,
};
pub use matching_service::{
    BroadcastInput, BroadcastOutcome, DirectRequestInput, Matchmaker, MatchingService,
    RequestParty, RequestView, StatusView, TutorCard,
};
pub use messaging_service::{
    ConversationOverview, ConversationView, MessagePreview, MessageView, Messenger,
    MessagingService, RequestSummary,
};
pub use moderation_service::{
    ConversationTranscript, ModerationDesk, ModerationService, ParticipantDetail, ReportOverview,
    ReportStatusView, ReportView, ReportedConversation, ReporterCard, RequestContext,
    TranscriptMessage,
};
pub use notification_service::{NotificationCenter, NotificationService, NotificationView};
pub use profile_service::{
    AvailabilityView, ExceptionView, PreferencesView, ProfileManager, ProfileService,
};

// Parallel execution utilities
pub use container::parallel;

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
