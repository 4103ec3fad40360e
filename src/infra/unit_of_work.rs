//! Unit of Work pattern implementation.
//!
//! SOLID (SRP): Manages transaction lifecycle and repository access.
//! DDD: Coordinates operations across multiple aggregates atomically.
//!
//! The Unit of Work pattern:
//! - Centralizes access to all repositories
//! - Manages database transactions (begin, commit, rollback)
//! - Ensures consistency across multiple repository operations
//! - Provides atomic operations for complex business workflows
//!
//! The matching lifecycle is the only consumer of multi-repository
//! transactions: direct requests, broadcast fan-out and status updates
//! must never partially commit their request/conversation/notification
//! writes.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    AccessMode, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, IsolationLevel, QueryFilter, Set, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

use super::repositories::{
    get_or_create_on, ConversationRepository, ConversationStore, NotificationRepository,
    NotificationStore, ProfileRepository, ProfileStore, ReportRepository, ReportStore,
    RequestRepository, RequestStore, TokenRepository, TokenStore, UserRepository, UserStore,
};
use crate::domain::{
    AbuseReport, Conversation, NewNotification, NewReport, NewRequest, Notification,
    ReportStatus, RequestStatus, TutoringRequest,
};
use crate::errors::{AppError, AppResult};

/// Unit of Work trait for dependency injection.
///
/// Provides centralized access to all repositories and transaction management.
/// Note: This trait is not mockable directly due to the generic
/// `transaction` method. Tests use an in-memory implementation instead.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Get user repository
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Get tutoring profile repository
    fn profiles(&self) -> Arc<dyn ProfileRepository>;

    /// Get tutoring request repository (read side)
    fn requests(&self) -> Arc<dyn RequestRepository>;

    /// Get conversation repository
    fn conversations(&self) -> Arc<dyn ConversationRepository>;

    /// Get notification repository (read side)
    fn notifications(&self) -> Arc<dyn NotificationRepository>;

    /// Get abuse report repository
    fn reports(&self) -> Arc<dyn ReportRepository>;

    /// Get account token repository
    fn tokens(&self) -> Arc<dyn TokenRepository>;

    /// Execute a closure within a transaction.
    ///
    /// The transaction is automatically committed on success or rolled back on error.
    /// Uses ReadCommitted isolation level for balanced consistency/performance.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(
                &'a dyn TxContext,
            ) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;
}

/// Repository access within a transaction.
///
/// Object-safe so alternative backends (the in-memory test store) can
/// run the same closures the SQL implementation runs.
pub trait TxContext: Send + Sync {
    /// Transactional request writes
    fn requests(&self) -> &dyn RequestTx;

    /// Transactional conversation writes
    fn conversations(&self) -> &dyn ConversationTx;

    /// Transactional notification writes
    fn notifications(&self) -> &dyn NotificationTx;

    /// Transactional report writes
    fn reports(&self) -> &dyn ReportTx;
}

/// Request writes available inside a transaction.
#[async_trait]
pub trait RequestTx: Send + Sync {
    /// Insert a single request row
    async fn insert(&self, request: NewRequest) -> AppResult<TutoringRequest>;

    /// Insert a broadcast fan-out, returning the row count
    async fn insert_many(&self, requests: Vec<NewRequest>) -> AppResult<u64>;

    /// Persist a status change
    async fn set_status(&self, id: Uuid, status: RequestStatus) -> AppResult<TutoringRequest>;

    /// Point the request at its conversation
    async fn link_conversation(&self, id: Uuid, conversation_id: Uuid) -> AppResult<()>;
}

/// Conversation writes available inside a transaction.
#[async_trait]
pub trait ConversationTx: Send + Sync {
    /// Find-or-create for an unordered participant pair.
    /// `request_hint` is stored only when a new row is created.
    async fn get_or_create(
        &self,
        a: Uuid,
        b: Uuid,
        request_hint: Option<Uuid>,
    ) -> AppResult<Conversation>;

    /// Point the conversation back at the request that spawned it
    async fn link_request(&self, id: Uuid, request_id: Uuid) -> AppResult<()>;
}

/// Notification writes available inside a transaction.
#[async_trait]
pub trait NotificationTx: Send + Sync {
    /// Emit a single notification
    async fn insert(&self, notification: NewNotification) -> AppResult<Notification>;

    /// Emit a batch of notifications, returning the row count
    async fn insert_many(&self, notifications: Vec<NewNotification>) -> AppResult<u64>;
}

/// Report writes available inside a transaction.
#[async_trait]
pub trait ReportTx: Send + Sync {
    /// File a report, status Open
    async fn insert(&self, reporter_id: Uuid, report: NewReport) -> AppResult<AbuseReport>;
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
    profile_repo: Arc<ProfileStore>,
    request_repo: Arc<RequestStore>,
    conversation_repo: Arc<ConversationStore>,
    notification_repo: Arc<NotificationStore>,
    report_repo: Arc<ReportStore>,
    token_repo: Arc<TokenStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            profile_repo: Arc::new(ProfileStore::new(db.clone())),
            request_repo: Arc::new(RequestStore::new(db.clone())),
            conversation_repo: Arc::new(ConversationStore::new(db.clone())),
            notification_repo: Arc::new(NotificationStore::new(db.clone())),
            report_repo: Arc::new(ReportStore::new(db.clone())),
            token_repo: Arc::new(TokenStore::new(db.clone())),
            db,
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn profiles(&self) -> Arc<dyn ProfileRepository> {
        self.profile_repo.clone()
    }

    fn requests(&self) -> Arc<dyn RequestRepository> {
        self.request_repo.clone()
    }

    fn conversations(&self) -> Arc<dyn ConversationRepository> {
        self.conversation_repo.clone()
    }

    fn notifications(&self) -> Arc<dyn NotificationRepository> {
        self.notification_repo.clone()
    }

    fn reports(&self) -> Arc<dyn ReportRepository> {
        self.report_repo.clone()
    }

    fn tokens(&self) -> Arc<dyn TokenRepository> {
        self.token_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(
                &'a dyn TxContext,
            ) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        // Begin transaction
        let txn = self
            .db
            .begin_with_config(
                Some(IsolationLevel::ReadCommitted),
                Some(AccessMode::ReadWrite),
            )
            .await
            .map_err(AppError::from)?;

        // Create context with borrowed transaction
        let ctx = SqlTxContext::new(&txn);

        // Execute the closure
        match f(&ctx).await {
            Ok(result) => {
                // Commit on success - txn is owned, so this always works
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                // Rollback on error
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

/// SQL-backed transaction context borrowing an open transaction.
struct SqlTxContext<'a> {
    requests: TxRequestStore<'a>,
    conversations: TxConversationStore<'a>,
    notifications: TxNotificationStore<'a>,
    reports: TxReportStore<'a>,
}

impl<'a> SqlTxContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self {
            requests: TxRequestStore { txn },
            conversations: TxConversationStore { txn },
            notifications: TxNotificationStore { txn },
            reports: TxReportStore { txn },
        }
    }
}

impl TxContext for SqlTxContext<'_> {
    fn requests(&self) -> &dyn RequestTx {
        &self.requests
    }

    fn conversations(&self) -> &dyn ConversationTx {
        &self.conversations
    }

    fn notifications(&self) -> &dyn NotificationTx {
        &self.notifications
    }

    fn reports(&self) -> &dyn ReportTx {
        &self.reports
    }
}

/// Transaction-aware request writes.
struct TxRequestStore<'a> {
    txn: &'a DatabaseTransaction,
}

fn request_active_model(
    request: NewRequest,
) -> super::repositories::entities::tutoring_request::ActiveModel {
    use super::repositories::entities::tutoring_request::ActiveModel;

    let now = chrono::Utc::now();
    ActiveModel {
        id: Set(Uuid::new_v4()),
        student_id: Set(request.student_id),
        tutor_id: Set(request.tutor_id),
        subject: Set(request.subject.to_string()),
        level: Set(request.level.db_label().to_string()),
        slot_id: Set(request.slot.to_string()),
        date: Set(request.date),
        status: Set(RequestStatus::Pending.to_string()),
        is_broadcast: Set(request.is_broadcast),
        conversation_id: Set(request.conversation_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

#[async_trait]
impl RequestTx for TxRequestStore<'_> {
    async fn insert(&self, request: NewRequest) -> AppResult<TutoringRequest> {
        use super::repositories::entities::tutoring_request::Entity as RequestEntity;

        let model = RequestEntity::insert(request_active_model(request))
            .exec_with_returning(self.txn)
            .await
            .map_err(AppError::from)?;

        Ok(TutoringRequest::from(model))
    }

    async fn insert_many(&self, requests: Vec<NewRequest>) -> AppResult<u64> {
        use super::repositories::entities::tutoring_request::Entity as RequestEntity;

        if requests.is_empty() {
            return Ok(0);
        }

        let rows = requests.into_iter().map(request_active_model);
        let inserted = RequestEntity::insert_many(rows)
            .exec_without_returning(self.txn)
            .await
            .map_err(AppError::from)?;

        Ok(inserted)
    }

    async fn set_status(&self, id: Uuid, status: RequestStatus) -> AppResult<TutoringRequest> {
        use super::repositories::entities::tutoring_request::{
            ActiveModel, Entity as RequestEntity,
        };

        let found = RequestEntity::find_by_id(id)
            .one(self.txn)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = found.into();
        active.status = Set(status.to_string());
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(self.txn).await.map_err(AppError::from)?;
        Ok(TutoringRequest::from(model))
    }

    async fn link_conversation(&self, id: Uuid, conversation_id: Uuid) -> AppResult<()> {
        use super::repositories::entities::tutoring_request::{self, Entity as RequestEntity};

        RequestEntity::update_many()
            .col_expr(
                tutoring_request::Column::ConversationId,
                Expr::value(conversation_id),
            )
            .col_expr(
                tutoring_request::Column::UpdatedAt,
                Expr::value(chrono::Utc::now()),
            )
            .filter(tutoring_request::Column::Id.eq(id))
            .exec(self.txn)
            .await
            .map_err(AppError::from)?;

        Ok(())
    }
}

/// Transaction-aware conversation writes.
struct TxConversationStore<'a> {
    txn: &'a DatabaseTransaction,
}

#[async_trait]
impl ConversationTx for TxConversationStore<'_> {
    async fn get_or_create(
        &self,
        a: Uuid,
        b: Uuid,
        request_hint: Option<Uuid>,
    ) -> AppResult<Conversation> {
        get_or_create_on(self.txn, a, b, request_hint).await
    }

    async fn link_request(&self, id: Uuid, request_id: Uuid) -> AppResult<()> {
        use super::repositories::entities::conversation::{self, Entity as ConversationEntity};

        ConversationEntity::update_many()
            .col_expr(conversation::Column::RequestId, Expr::value(request_id))
            .filter(conversation::Column::Id.eq(id))
            .exec(self.txn)
            .await
            .map_err(AppError::from)?;

        Ok(())
    }
}

/// Transaction-aware notification writes.
struct TxNotificationStore<'a> {
    txn: &'a DatabaseTransaction,
}

fn notification_active_model(
    notification: NewNotification,
) -> super::repositories::entities::notification::ActiveModel {
    use super::repositories::entities::notification::ActiveModel;

    ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(notification.user_id),
        kind: Set(notification.kind.to_string()),
        title: Set(notification.title),
        message: Set(notification.message),
        read: Set(false),
        created_at: Set(chrono::Utc::now()),
    }
}

#[async_trait]
impl NotificationTx for TxNotificationStore<'_> {
    async fn insert(&self, notification: NewNotification) -> AppResult<Notification> {
        use super::repositories::entities::notification::Entity as NotificationEntity;

        let model = NotificationEntity::insert(notification_active_model(notification))
            .exec_with_returning(self.txn)
            .await
            .map_err(AppError::from)?;

        Ok(Notification::from(model))
    }

    async fn insert_many(&self, notifications: Vec<NewNotification>) -> AppResult<u64> {
        use super::repositories::entities::notification::Entity as NotificationEntity;

        if notifications.is_empty() {
            return Ok(0);
        }

        let rows = notifications.into_iter().map(notification_active_model);
        let inserted = NotificationEntity::insert_many(rows)
            .exec_without_returning(self.txn)
            .await
            .map_err(AppError::from)?;

        Ok(inserted)
    }
}

/// Transaction-aware report writes.
struct TxReportStore<'a> {
    txn: &'a DatabaseTransaction,
}

#[async_trait]
impl ReportTx for TxReportStore<'_> {
    async fn insert(&self, reporter_id: Uuid, report: NewReport) -> AppResult<AbuseReport> {
        use super::repositories::entities::abuse_report::ActiveModel;

        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            reporter_id: Set(reporter_id),
            conversation_id: Set(report.conversation_id),
            message_id: Set(report.message_id),
            reason: Set(report.reason),
            description: Set(report.description),
            status: Set(ReportStatus::Open.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(self.txn).await.map_err(AppError::from)?;
        Ok(AbuseReport::from(model))
    }
}
