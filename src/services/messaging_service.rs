//! Messaging service - Conversations between matched students.
//!
//! SOLID (SRP): Handles conversations and messages only.
//! DDD: Pair normalization and content sanitization live in
//! domain::conversation; this service enforces access and hydrates views.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    sanitize_message, Conversation, Message, RequestStatus, Subject, TutoringRequest, UserCard,
};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::services::parallel;

/// A conversation as returned when opened explicitly.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationView {
    pub id: Uuid,
    pub participant_lo: Uuid,
    pub participant_hi: Uuid,
    pub request_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<Conversation> for ConversationView {
    fn from(conversation: Conversation) -> Self {
        Self {
            id: conversation.id,
            participant_lo: conversation.participant_lo,
            participant_hi: conversation.participant_hi,
            request_id: conversation.request_id,
            created_at: conversation.created_at,
        }
    }
}

/// The spawning request, summarized for conversation lists.
#[derive(Debug, Serialize, ToSchema)]
pub struct RequestSummary {
    pub id: Uuid,
    pub subject: Subject,
    #[schema(example = "Lundi_S3")]
    pub slot_id: String,
    pub status: RequestStatus,
}

impl From<TutoringRequest> for RequestSummary {
    fn from(request: TutoringRequest) -> Self {
        Self {
            id: request.id,
            subject: request.subject,
            slot_id: request.slot.to_string(),
            status: request.status,
        }
    }
}

/// The newest message, shown as a teaser in conversation lists.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessagePreview {
    pub id: Uuid,
    pub content: String,
    pub sender_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessagePreview {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            content: message.content,
            sender_id: message.sender_id,
            created_at: message.created_at,
        }
    }
}

/// One entry of the conversation list, from the viewer's perspective.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationOverview {
    pub id: Uuid,
    /// The other participant
    pub participant: UserCard,
    pub request_id: Option<Uuid>,
    /// Present when the conversation was spawned by a request
    pub request: Option<RequestSummary>,
    pub last_message: Option<MessagePreview>,
    /// Unread messages authored by the other participant
    pub unread_count: u64,
    pub updated_at: DateTime<Utc>,
}

/// A message with its sender card.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageView {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub sender: UserCard,
    pub content: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl MessageView {
    fn new(message: Message, sender: UserCard) -> Self {
        Self {
            id: message.id,
            conversation_id: message.conversation_id,
            sender_id: message.sender_id,
            sender,
            content: message.content,
            read: message.read,
            created_at: message.created_at,
        }
    }
}

/// Messaging service trait for dependency injection.
#[async_trait]
pub trait MessagingService: Send + Sync {
    /// The viewer's conversations, most recently active first
    async fn list_conversations(&self, viewer: Uuid) -> AppResult<Vec<ConversationOverview>>;

    /// Open (or return) the conversation with another user.
    /// Idempotent for the unordered pair.
    async fn open_conversation(
        &self,
        user_id: Uuid,
        participant_id: Uuid,
        request_id: Option<Uuid>,
    ) -> AppResult<ConversationView>;

    /// Full message history, oldest first. Participants only.
    async fn messages(&self, viewer: Uuid, conversation_id: Uuid) -> AppResult<Vec<MessageView>>;

    /// Append a message and bump the conversation's recency
    async fn send_message(
        &self,
        sender_id: Uuid,
        conversation_id: Uuid,
        content: String,
    ) -> AppResult<MessageView>;

    /// Mark the other participant's messages read, returning how many
    async fn mark_read(&self, viewer: Uuid, conversation_id: Uuid) -> AppResult<u64>;
}

/// Concrete implementation of MessagingService using Unit of Work.
pub struct Messenger<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> Messenger<U> {
    /// Create new messaging service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// The conversation, provided the viewer is one of its participants.
    async fn require_participant(
        &self,
        viewer: Uuid,
        conversation_id: Uuid,
    ) -> AppResult<Conversation> {
        let conversation = self
            .uow
            .conversations()
            .find_by_id(conversation_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !conversation.includes(viewer) {
            return Err(AppError::Forbidden);
        }
        Ok(conversation)
    }

    async fn overview_of(
        &self,
        viewer: Uuid,
        conversation: &Conversation,
        partners: &HashMap<Uuid, UserCard>,
    ) -> AppResult<ConversationOverview> {
        let partner_id = conversation
            .partner_of(viewer)
            .ok_or_else(|| AppError::internal("Viewer not among conversation participants"))?;
        let participant = partners
            .get(&partner_id)
            .cloned()
            .ok_or_else(|| AppError::internal("Conversation partner missing from directory"))?;

        let request = match conversation.request_id {
            Some(request_id) => self
                .uow
                .requests()
                .find_by_id(request_id)
                .await?
                .map(RequestSummary::from),
            None => None,
        };

        let (last_message, unread_count) = parallel::join2(
            self.uow.conversations().last_message(conversation.id),
            self.uow.conversations().unread_count(conversation.id, viewer),
        )
        .await?;

        Ok(ConversationOverview {
            id: conversation.id,
            participant,
            request_id: conversation.request_id,
            request,
            last_message: last_message.map(MessagePreview::from),
            unread_count,
            updated_at: conversation.updated_at,
        })
    }
}

#[async_trait]
impl<U: UnitOfWork> MessagingService for Messenger<U> {
    async fn list_conversations(&self, viewer: Uuid) -> AppResult<Vec<ConversationOverview>> {
        let conversations = self.uow.conversations().list_for_user(viewer).await?;

        let mut partner_ids: Vec<Uuid> = conversations
            .iter()
            .filter_map(|c| c.partner_of(viewer))
            .collect();
        partner_ids.sort_unstable();
        partner_ids.dedup();

        let partners: HashMap<Uuid, UserCard> = self
            .uow
            .users()
            .find_many(partner_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, UserCard::from(user)))
            .collect();

        let overviews = parallel::join_all(
            conversations
                .iter()
                .map(|conversation| self.overview_of(viewer, conversation, &partners))
                .collect(),
        )
        .await?;

        Ok(overviews)
    }

    async fn open_conversation(
        &self,
        user_id: Uuid,
        participant_id: Uuid,
        request_id: Option<Uuid>,
    ) -> AppResult<ConversationView> {
        if participant_id == user_id {
            return Err(AppError::SelfTarget);
        }

        self.uow
            .users()
            .find_by_id(participant_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let conversation = self
            .uow
            .conversations()
            .get_or_create(user_id, participant_id, request_id)
            .await?;

        Ok(ConversationView::from(conversation))
    }

    async fn messages(&self, viewer: Uuid, conversation_id: Uuid) -> AppResult<Vec<MessageView>> {
        self.require_participant(viewer, conversation_id).await?;

        let messages = self.uow.conversations().messages(conversation_id).await?;

        let mut sender_ids: Vec<Uuid> = messages.iter().map(|m| m.sender_id).collect();
        sender_ids.sort_unstable();
        sender_ids.dedup();

        let senders: HashMap<Uuid, UserCard> = self
            .uow
            .users()
            .find_many(sender_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, UserCard::from(user)))
            .collect();

        messages
            .into_iter()
            .map(|message| {
                let sender = senders
                    .get(&message.sender_id)
                    .cloned()
                    .ok_or_else(|| AppError::internal("Message sender missing from directory"))?;
                Ok(MessageView::new(message, sender))
            })
            .collect()
    }

    async fn send_message(
        &self,
        sender_id: Uuid,
        conversation_id: Uuid,
        content: String,
    ) -> AppResult<MessageView> {
        self.require_participant(sender_id, conversation_id).await?;

        let clean = sanitize_message(&content)?;
        let message = self
            .uow
            .conversations()
            .append_message(conversation_id, sender_id, clean)
            .await?;

        let sender = self
            .uow
            .users()
            .find_by_id(sender_id)
            .await?
            .map(UserCard::from)
            .ok_or_else(|| AppError::internal("Message sender missing from directory"))?;

        tracing::debug!(
            conversation_id = %conversation_id,
            sender_id = %sender_id,
            "Message sent"
        );

        Ok(MessageView::new(message, sender))
    }

    async fn mark_read(&self, viewer: Uuid, conversation_id: Uuid) -> AppResult<u64> {
        self.require_participant(viewer, conversation_id).await?;

        self.uow
            .conversations()
            .mark_read(conversation_id, viewer)
            .await
    }
}
