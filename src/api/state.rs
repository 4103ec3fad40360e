//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::infra::Database;
use crate::services::{
    AuthService, MatchingService, MessagingService, ModerationService, NotificationService,
    ProfileService, ServiceContainer, Services,
};

/// Application state containing all services (DI container).
///
/// Use `from_config()` for recommended initialization with full
/// ServiceContainer and UnitOfWork support.
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// Tutor profile service
    pub profile_service: Arc<dyn ProfileService>,
    /// Matching and request lifecycle service
    pub matching_service: Arc<dyn MatchingService>,
    /// Conversation and messaging service
    pub messaging_service: Arc<dyn MessagingService>,
    /// Abuse reporting and moderation service
    pub moderation_service: Arc<dyn ModerationService>,
    /// Notification feed service
    pub notification_service: Arc<dyn NotificationService>,
    /// Database connection
    pub database: Arc<Database>,
    /// Internal service container (optional, only with from_config)
    service_container: Option<Arc<Services>>,
}

impl AppState {
    /// Create application state from database connection and config.
    ///
    /// This is the recommended way to create AppState as it uses
    /// the ServiceContainer for centralized service management.
    pub fn from_config(database: Arc<Database>, config: crate::config::Config) -> Self {
        let container = Arc::new(Services::from_connection(
            database.get_connection(),
            config,
        ));

        Self {
            auth_service: container.auth(),
            profile_service: container.profiles(),
            matching_service: container.matching(),
            messaging_service: container.messaging(),
            moderation_service: container.moderation(),
            notification_service: container.notifications(),
            database,
            service_container: Some(container),
        }
    }

    /// Create new application state with manually injected services.
    ///
    /// Note: This method does not provide ServiceContainer access.
    /// Use `from_config()` for full functionality.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        profile_service: Arc<dyn ProfileService>,
        matching_service: Arc<dyn MatchingService>,
        messaging_service: Arc<dyn MessagingService>,
        moderation_service: Arc<dyn ModerationService>,
        notification_service: Arc<dyn NotificationService>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            auth_service,
            profile_service,
            matching_service,
            messaging_service,
            moderation_service,
            notification_service,
            database,
            service_container: None,
        }
    }

    /// Get the service container for centralized service access.
    ///
    /// Returns `Some` only if created via `from_config()`.
    pub fn services(&self) -> Option<&Arc<Services>> {
        self.service_container.as_ref()
    }
}
