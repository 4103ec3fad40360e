//! Moderation service - Abuse reports and conversation inspection.
//!
//! SOLID (SRP): Handles report filing and moderator triage only.
//! Filing is open to any authenticated student; listing, triage and
//! transcript inspection are gated on the moderator role by the route
//! layer, so this service never re-checks roles itself.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    AbuseReport, Conversation, NewNotification, NewReport, ReportStatus, RequestStatus, Subject,
    User, UserCard,
};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::services::parallel;

/// A filed report, echoed back to the reporter.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReportView {
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub conversation_id: Option<Uuid>,
    pub message_id: Option<Uuid>,
    pub reason: String,
    pub description: String,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
}

impl From<AbuseReport> for ReportView {
    fn from(report: AbuseReport) -> Self {
        Self {
            id: report.id,
            reporter_id: report.reporter_id,
            conversation_id: report.conversation_id,
            message_id: report.message_id,
            reason: report.reason,
            description: report.description,
            status: report.status,
            created_at: report.created_at,
        }
    }
}

/// The reporter as shown to moderators. Email included so the
/// moderation team can follow up directly.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReporterCard {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    #[schema(example = "thomas@lycee.fr")]
    pub email: String,
}

impl From<&User> for ReporterCard {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
        }
    }
}

/// The reported conversation, reduced to its participants.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReportedConversation {
    pub id: Uuid,
    pub participants: Vec<UserCard>,
}

/// A report as listed on the moderation dashboard.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReportOverview {
    pub id: Uuid,
    pub reporter: ReporterCard,
    pub conversation_id: Option<Uuid>,
    pub message_id: Option<Uuid>,
    pub reason: String,
    pub description: String,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Present when the report targets a conversation that still exists
    pub conversation: Option<ReportedConversation>,
}

/// Acknowledgement of a triage decision.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReportStatusView {
    pub id: Uuid,
    pub status: ReportStatus,
    pub updated_at: DateTime<Utc>,
}

/// A conversation participant as shown during an inspection.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ParticipantDetail {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Class level as displayed to students
    #[schema(example = "2nde")]
    pub class_level: String,
}

impl From<&User> for ParticipantDetail {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            class_level: user.class_level.wire_label().to_string(),
        }
    }
}

/// The request that spawned the conversation, shown for context.
#[derive(Debug, Serialize, ToSchema)]
pub struct RequestContext {
    pub id: Uuid,
    pub subject: Subject,
    /// Requested level as displayed to students
    #[schema(example = "2nde")]
    pub level: String,
    #[schema(example = "Lundi_S3")]
    pub slot_id: String,
    pub status: RequestStatus,
}

/// One message inside an inspected transcript.
#[derive(Debug, Serialize, ToSchema)]
pub struct TranscriptMessage {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub sender: UserCard,
    pub content: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Full conversation transcript for moderator review.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationTranscript {
    pub id: Uuid,
    pub participants: Vec<ParticipantDetail>,
    pub request: Option<RequestContext>,
    /// Oldest first
    pub messages: Vec<TranscriptMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Moderation service trait for dependency injection.
#[async_trait]
pub trait ModerationService: Send + Sync {
    /// File an abuse report and alert every moderator, atomically
    async fn report_abuse(&self, reporter_id: Uuid, report: NewReport) -> AppResult<ReportView>;

    /// Every report, newest first, hydrated for the dashboard
    async fn list_reports(&self) -> AppResult<Vec<ReportOverview>>;

    /// Move a report to a new triage status
    async fn update_report_status(
        &self,
        report_id: Uuid,
        status: ReportStatus,
    ) -> AppResult<ReportStatusView>;

    /// Full transcript of any conversation, bypassing participant checks
    async fn inspect_conversation(
        &self,
        conversation_id: Uuid,
    ) -> AppResult<ConversationTranscript>;
}

/// Concrete implementation of ModerationService using Unit of Work.
pub struct ModerationDesk<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> ModerationDesk<U> {
    /// Create new moderation service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn require_user(&self, id: Uuid) -> AppResult<User> {
        self.uow
            .users()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)
    }
}

#[async_trait]
impl<U: UnitOfWork> ModerationService for ModerationDesk<U> {
    async fn report_abuse(&self, reporter_id: Uuid, report: NewReport) -> AppResult<ReportView> {
        if !report.has_target() {
            return Err(AppError::validation(
                "A conversation or message target is required",
            ));
        }

        let (reporter, moderators) = parallel::join2(
            self.require_user(reporter_id),
            self.uow.users().list_moderators(),
        )
        .await?;

        // The report row and the moderator alerts land together
        let stored = self
            .uow
            .transaction(move |tx| {
                Box::pin(async move {
                    let stored = tx.reports().insert(reporter.id, report).await?;

                    let alerts = moderators
                        .iter()
                        .map(|moderator| NewNotification::abuse_report(moderator.id, &reporter))
                        .collect();
                    tx.notifications().insert_many(alerts).await?;

                    Ok(stored)
                })
            })
            .await?;

        tracing::info!(
            report_id = %stored.id,
            reporter_id = %reporter_id,
            "Abuse report filed"
        );

        Ok(ReportView::from(stored))
    }

    async fn list_reports(&self) -> AppResult<Vec<ReportOverview>> {
        let reports = self.uow.reports().list().await?;

        let mut conversation_ids: Vec<Uuid> =
            reports.iter().filter_map(|r| r.conversation_id).collect();
        conversation_ids.sort_unstable();
        conversation_ids.dedup();

        let conversation_repo = self.uow.conversations();
        let conversations: HashMap<Uuid, Conversation> = parallel::join_all(
            conversation_ids
                .into_iter()
                .map(|id| conversation_repo.find_by_id(id))
                .collect(),
        )
        .await?
        .into_iter()
        .flatten()
        .map(|conversation| (conversation.id, conversation))
        .collect();

        // One directory lookup covers reporters and participants alike
        let mut user_ids: Vec<Uuid> = reports.iter().map(|r| r.reporter_id).collect();
        for conversation in conversations.values() {
            user_ids.push(conversation.participant_lo);
            user_ids.push(conversation.participant_hi);
        }
        user_ids.sort_unstable();
        user_ids.dedup();

        let directory: HashMap<Uuid, User> = self
            .uow
            .users()
            .find_many(user_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        reports
            .into_iter()
            .map(|report| {
                let reporter = directory
                    .get(&report.reporter_id)
                    .map(ReporterCard::from)
                    .ok_or_else(|| AppError::internal("Reporter missing from directory"))?;

                let conversation = report
                    .conversation_id
                    .and_then(|id| conversations.get(&id))
                    .map(|conversation| ReportedConversation {
                        id: conversation.id,
                        participants: [conversation.participant_lo, conversation.participant_hi]
                            .iter()
                            .filter_map(|id| directory.get(id))
                            .map(UserCard::from)
                            .collect(),
                    });

                Ok(ReportOverview {
                    id: report.id,
                    reporter,
                    conversation_id: report.conversation_id,
                    message_id: report.message_id,
                    reason: report.reason,
                    description: report.description,
                    status: report.status,
                    created_at: report.created_at,
                    updated_at: report.updated_at,
                    conversation,
                })
            })
            .collect()
    }

    async fn update_report_status(
        &self,
        report_id: Uuid,
        status: ReportStatus,
    ) -> AppResult<ReportStatusView> {
        let report = self.uow.reports().set_status(report_id, status).await?;

        tracing::info!(
            report_id = %report_id,
            status = %status,
            "Report triage status updated"
        );

        Ok(ReportStatusView {
            id: report.id,
            status: report.status,
            updated_at: report.updated_at,
        })
    }

    async fn inspect_conversation(
        &self,
        conversation_id: Uuid,
    ) -> AppResult<ConversationTranscript> {
        let conversation = self
            .uow
            .conversations()
            .find_by_id(conversation_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let messages = self.uow.conversations().messages(conversation_id).await?;

        let request = match conversation.request_id {
            Some(request_id) => self
                .uow
                .requests()
                .find_by_id(request_id)
                .await?
                .map(|request| RequestContext {
                    id: request.id,
                    subject: request.subject,
                    level: request.level.wire_label().to_string(),
                    slot_id: request.slot.to_string(),
                    status: request.status,
                }),
            None => None,
        };

        let mut user_ids = vec![conversation.participant_lo, conversation.participant_hi];
        user_ids.extend(messages.iter().map(|m| m.sender_id));
        user_ids.sort_unstable();
        user_ids.dedup();

        let directory: HashMap<Uuid, User> = self
            .uow
            .users()
            .find_many(user_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        let participants = [conversation.participant_lo, conversation.participant_hi]
            .iter()
            .map(|id| {
                directory
                    .get(id)
                    .map(ParticipantDetail::from)
                    .ok_or_else(|| AppError::internal("Participant missing from directory"))
            })
            .collect::<AppResult<Vec<_>>>()?;

        let messages = messages
            .into_iter()
            .map(|message| {
                let sender = directory
                    .get(&message.sender_id)
                    .map(UserCard::from)
                    .ok_or_else(|| AppError::internal("Message sender missing from directory"))?;
                Ok(TranscriptMessage {
                    id: message.id,
                    sender_id: message.sender_id,
                    sender,
                    content: message.content,
                    read: message.read,
                    created_at: message.created_at,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(ConversationTranscript {
            id: conversation.id,
            participants,
            request,
            messages,
            created_at: conversation.created_at,
            updated_at: conversation.updated_at,
        })
    }
}
