//! Service Container - Centralized service access with parallel execution support.
//!
//! SOLID (SRP): Manages service lifecycle and access.
//! SOLID (DIP): Depends on service traits, not implementations.
//!
//! Features:
//! - Centralized access to all application services
//! - Thread-safe concurrent access via Arc
//! - Parallel execution utilities for independent operations
//! - Compatible with async/await and tokio runtime

use std::future::Future;
use std::sync::Arc;

use super::{
    AuthService, MatchingService, MessagingService, ModerationService, NotificationService,
    ProfileService,
};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{Mailer, Persistence};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
///
/// Provides centralized access to all application services.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get tutor profile service
    fn profiles(&self) -> Arc<dyn ProfileService>;

    /// Get matching service
    fn matching(&self) -> Arc<dyn MatchingService>;

    /// Get messaging service
    fn messaging(&self) -> Arc<dyn MessagingService>;

    /// Get moderation service
    fn moderation(&self) -> Arc<dyn ModerationService>;

    /// Get notification service
    fn notifications(&self) -> Arc<dyn NotificationService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    profile_service: Arc<dyn ProfileService>,
    matching_service: Arc<dyn MatchingService>,
    messaging_service: Arc<dyn MessagingService>,
    moderation_service: Arc<dyn ModerationService>,
    notification_service: Arc<dyn NotificationService>,
}

impl Services {
    /// Create a new service container with all services initialized
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        profile_service: Arc<dyn ProfileService>,
        matching_service: Arc<dyn MatchingService>,
        messaging_service: Arc<dyn MessagingService>,
        moderation_service: Arc<dyn ModerationService>,
        notification_service: Arc<dyn NotificationService>,
    ) -> Self {
        Self {
            auth_service,
            profile_service,
            matching_service,
            messaging_service,
            moderation_service,
            notification_service,
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        use super::{
            Authenticator, Matchmaker, Messenger, ModerationDesk, NotificationCenter,
            ProfileManager,
        };

        let mailer = Arc::new(Mailer::from_env(config.frontend_url.clone()));
        let uow = Arc::new(Persistence::new(db));

        let auth_service = Arc::new(Authenticator::new(uow.clone(), mailer, config));
        let profile_service = Arc::new(ProfileManager::new(uow.clone()));
        let matching_service = Arc::new(Matchmaker::new(uow.clone()));
        let messaging_service = Arc::new(Messenger::new(uow.clone()));
        let moderation_service = Arc::new(ModerationDesk::new(uow.clone()));
        let notification_service = Arc::new(NotificationCenter::new(uow));

        Self {
            auth_service,
            profile_service,
            matching_service,
            messaging_service,
            moderation_service,
            notification_service,
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn profiles(&self) -> Arc<dyn ProfileService> {
        self.profile_service.clone()
    }

    fn matching(&self) -> Arc<dyn MatchingService> {
        self.matching_service.clone()
    }

    fn messaging(&self) -> Arc<dyn MessagingService> {
        self.messaging_service.clone()
    }

    fn moderation(&self) -> Arc<dyn ModerationService> {
        self.moderation_service.clone()
    }

    fn notifications(&self) -> Arc<dyn NotificationService> {
        self.notification_service.clone()
    }
}

/// Parallel execution utilities for running independent operations concurrently.
///
/// These functions leverage tokio's async runtime to execute multiple
/// independent operations in parallel, improving throughput.
pub mod parallel {
    use super::*;
    use tokio::try_join;

    /// Execute two independent async operations in parallel.
    ///
    /// Both operations run concurrently and the function returns when both complete.
    /// If either operation fails, the error is returned immediately.
    ///
    /// # Example
    /// ```ignore
    /// let (student, tutor) = parallel::join2(
    ///     users.find_by_id(student_id),
    ///     users.find_by_id(tutor_id),
    /// ).await?;
    /// ```
    pub async fn join2<F1, F2, T1, T2>(f1: F1, f2: F2) -> AppResult<(T1, T2)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
    {
        try_join!(f1, f2)
    }

    /// Execute a batch of operations in parallel, preserving order.
    ///
    /// All operations run concurrently. The whole batch fails if any
    /// single operation fails.
    ///
    /// # Example
    /// ```ignore
    /// let futures: Vec<_> = ids.iter().map(|id| repo.find_by_id(*id)).collect();
    /// let conversations = parallel::join_all(futures).await?;
    /// ```
    pub async fn join_all<F, T>(futures: Vec<F>) -> AppResult<Vec<T>>
    where
        F: Future<Output = AppResult<T>>,
    {
        let results = futures::future::join_all(futures).await;
        results.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    #[tokio::test]
    async fn test_parallel_join2() {
        async fn op1() -> AppResult<i32> {
            Ok(1)
        }
        async fn op2() -> AppResult<i32> {
            Ok(2)
        }

        let (a, b) = parallel::join2(op1(), op2()).await.unwrap();
        assert_eq!(a, 1);
        assert_eq!(b, 2);
    }

    #[tokio::test]
    async fn test_parallel_join_all() {
        let futures: Vec<_> = (0..5).map(|i| async move { Ok(i) as AppResult<i32> }).collect();
        let results = parallel::join_all(futures).await.unwrap();
        assert_eq!(results, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_join_all_surfaces_the_first_error() {
        let futures: Vec<_> = (0..3)
            .map(|i| async move {
                if i == 1 {
                    Err(AppError::NotFound)
                } else {
                    Ok(i)
                }
            })
            .collect();

        assert!(parallel::join_all(futures).await.is_err());
    }
}
