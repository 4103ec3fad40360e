//! Conversation and message repository.
//!
//! Lookup-or-create goes through a single helper backed by the unique
//! (participant_lo, participant_hi) index, so the same pair can never
//! produce two conversations even under concurrent requests.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use super::entities::conversation::{
    self, ActiveModel as ConversationActiveModel, Entity as ConversationEntity,
};
use super::entities::message::{self, ActiveModel as MessageActiveModel, Entity as MessageEntity};
use crate::domain::{normalize_pair, Conversation, Message};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Conversation repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Find conversation by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Conversation>>;

    /// Every conversation the user participates in, most recent first
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Conversation>>;

    /// Find the conversation for an unordered pair, creating it if
    /// absent. `request_hint` is stored only when a new row is created.
    async fn get_or_create(
        &self,
        a: Uuid,
        b: Uuid,
        request_hint: Option<Uuid>,
    ) -> AppResult<Conversation>;

    /// Messages in chronological order
    async fn messages(&self, conversation_id: Uuid) -> AppResult<Vec<Message>>;

    /// Append a message and bump the conversation's recency, atomically
    async fn append_message(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        content: String,
    ) -> AppResult<Message>;

    /// Mark every message from the other participant as read,
    /// returning the number of rows touched
    async fn mark_read(&self, conversation_id: Uuid, reader_id: Uuid) -> AppResult<u64>;

    /// Unread messages authored by the other participant
    async fn unread_count(&self, conversation_id: Uuid, viewer_id: Uuid) -> AppResult<u64>;

    /// The most recent message, if any
    async fn last_message(&self, conversation_id: Uuid) -> AppResult<Option<Message>>;
}

/// Find-or-insert over any connection, shared between the pool-backed
/// store and the transaction-aware store.
pub(crate) async fn get_or_create_on<C: ConnectionTrait>(
    conn: &C,
    a: Uuid,
    b: Uuid,
    request_hint: Option<Uuid>,
) -> AppResult<Conversation> {
    let (lo, hi) = normalize_pair(a, b);

    let existing = ConversationEntity::find()
        .filter(conversation::Column::ParticipantLo.eq(lo))
        .filter(conversation::Column::ParticipantHi.eq(hi))
        .one(conn)
        .await
        .map_err(AppError::from)?;

    if let Some(model) = existing {
        return Ok(Conversation::from(model));
    }

    let now = chrono::Utc::now();
    let insert = ConversationEntity::insert(ConversationActiveModel {
        id: Set(Uuid::new_v4()),
        participant_lo: Set(lo),
        participant_hi: Set(hi),
        request_id: Set(request_hint),
        created_at: Set(now),
        updated_at: Set(now),
    })
    .on_conflict(
        OnConflict::columns([
            conversation::Column::ParticipantLo,
            conversation::Column::ParticipantHi,
        ])
        .do_nothing()
        .to_owned(),
    );

    match insert.exec_with_returning(conn).await {
        Ok(model) => Ok(Conversation::from(model)),
        // Lost the race to a concurrent insert; the winner's row exists now.
        Err(DbErr::RecordNotInserted) => {
            let model = ConversationEntity::find()
                .filter(conversation::Column::ParticipantLo.eq(lo))
                .filter(conversation::Column::ParticipantHi.eq(hi))
                .one(conn)
                .await
                .map_err(AppError::from)?
                .ok_or_else(|| {
                    AppError::internal("Conversation missing after conflicting insert")
                })?;
            Ok(Conversation::from(model))
        }
        Err(e) => Err(AppError::from(e)),
    }
}

/// Concrete implementation of ConversationRepository
pub struct ConversationStore {
    db: DatabaseConnection,
}

impl ConversationStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ConversationRepository for ConversationStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Conversation>> {
        let result = ConversationEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Conversation::from))
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Conversation>> {
        let models = ConversationEntity::find()
            .filter(
                conversation::Column::ParticipantLo
                    .eq(user_id)
                    .or(conversation::Column::ParticipantHi.eq(user_id)),
            )
            .order_by_desc(conversation::Column::UpdatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Conversation::from).collect())
    }

    async fn get_or_create(
        &self,
        a: Uuid,
        b: Uuid,
        request_hint: Option<Uuid>,
    ) -> AppResult<Conversation> {
        get_or_create_on(&self.db, a, b, request_hint).await
    }

    async fn messages(&self, conversation_id: Uuid) -> AppResult<Vec<Message>> {
        let models = MessageEntity::find()
            .filter(message::Column::ConversationId.eq(conversation_id))
            .order_by_asc(message::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Message::from).collect())
    }

    async fn append_message(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        content: String,
    ) -> AppResult<Message> {
        let txn = self.db.begin().await.map_err(AppError::from)?;

        let now = chrono::Utc::now();
        let model = MessageActiveModel {
            id: Set(Uuid::new_v4()),
            conversation_id: Set(conversation_id),
            sender_id: Set(sender_id),
            content: Set(content),
            read: Set(false),
            created_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(AppError::from)?;

        ConversationEntity::update_many()
            .col_expr(conversation::Column::UpdatedAt, Expr::value(now))
            .filter(conversation::Column::Id.eq(conversation_id))
            .exec(&txn)
            .await
            .map_err(AppError::from)?;

        txn.commit().await.map_err(AppError::from)?;
        Ok(Message::from(model))
    }

    async fn mark_read(&self, conversation_id: Uuid, reader_id: Uuid) -> AppResult<u64> {
        let result = MessageEntity::update_many()
            .col_expr(message::Column::Read, Expr::value(true))
            .filter(message::Column::ConversationId.eq(conversation_id))
            .filter(message::Column::SenderId.ne(reader_id))
            .filter(message::Column::Read.eq(false))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected)
    }

    async fn unread_count(&self, conversation_id: Uuid, viewer_id: Uuid) -> AppResult<u64> {
        let count = MessageEntity::find()
            .filter(message::Column::ConversationId.eq(conversation_id))
            .filter(message::Column::SenderId.ne(viewer_id))
            .filter(message::Column::Read.eq(false))
            .count(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(count)
    }

    async fn last_message(&self, conversation_id: Uuid) -> AppResult<Option<Message>> {
        let result = MessageEntity::find()
            .filter(message::Column::ConversationId.eq(conversation_id))
            .order_by_desc(message::Column::CreatedAt)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Message::from))
    }
}
