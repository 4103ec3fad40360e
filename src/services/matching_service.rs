//! Matching service - Eligibility filtering and the request lifecycle.
//!
//! SOLID (SRP): Handles tutor matching and tutoring requests only.
//! DDD: The eligibility predicate itself lives in domain::matching;
//! this service feeds it the candidate pool and persists the outcome.
//!
//! Every write path here runs inside one transaction: a direct request,
//! a broadcast fan-out or a status change either lands completely or
//! not at all.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    filter_eligible, ClassLevel, MatchQuery, NewNotification, NewRequest, RequestMode,
    RequestStatus, SlotRef, Subject, TutoringRequest, User,
};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::services::parallel;

/// A tutor offered to the requesting student. The only view that
/// exposes another student's email, so the pair can make contact.
#[derive(Debug, Serialize, ToSchema)]
pub struct TutorCard {
    pub id: Uuid,
    #[schema(example = "Emma")]
    pub first_name: String,
    #[schema(example = "Martin")]
    pub last_name: String,
    #[schema(example = "emma@lycee.fr")]
    pub email: String,
    pub avatar_url: Option<String>,
    /// Class level as displayed to students
    #[schema(example = "Terminale")]
    pub class_level: String,
    pub specialties: Vec<String>,
}

impl From<&User> for TutorCard {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            avatar_url: user.avatar_url.clone(),
            class_level: user.class_level.wire_label().to_string(),
            specialties: user.specialties.clone(),
        }
    }
}

/// One side of a request as shown in request lists. No email here.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RequestParty {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// Class level as displayed to students
    #[schema(example = "2nde")]
    pub class_level: String,
    pub avatar_url: Option<String>,
}

impl From<&User> for RequestParty {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            class_level: user.class_level.wire_label().to_string(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

/// A tutoring request as returned by the API.
#[derive(Debug, Serialize, ToSchema)]
pub struct RequestView {
    pub id: Uuid,
    pub student_id: Uuid,
    pub tutor_id: Uuid,
    pub subject: Subject,
    /// Requested level as displayed to students
    #[schema(example = "2nde")]
    pub level: String,
    #[schema(example = "Lundi_S3")]
    pub slot_id: String,
    pub date: DateTime<Utc>,
    pub status: RequestStatus,
    pub is_broadcast: bool,
    pub conversation_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    /// Requesting student, present in list views
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<RequestParty>,
    /// Designated tutor, present in list views
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tutor: Option<RequestParty>,
}

impl From<TutoringRequest> for RequestView {
    fn from(request: TutoringRequest) -> Self {
        Self {
            id: request.id,
            student_id: request.student_id,
            tutor_id: request.tutor_id,
            subject: request.subject,
            level: request.level.wire_label().to_string(),
            slot_id: request.slot.to_string(),
            date: request.date,
            status: request.status,
            is_broadcast: request.is_broadcast,
            conversation_id: request.conversation_id,
            created_at: request.created_at,
            student: None,
            tutor: None,
        }
    }
}

/// Minimal acknowledgement of a status change.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusView {
    pub id: Uuid,
    pub status: RequestStatus,
}

/// Result of a broadcast call.
#[derive(Debug, Serialize, ToSchema)]
pub struct BroadcastOutcome {
    #[schema(example = "Appel envoyé à 3 tuteurs")]
    pub message: String,
    pub count: u64,
    /// Tutors that received a request row and a notification
    pub notified_tutor_ids: Vec<Uuid>,
}

/// Direct request payload, already validated by the handler.
#[derive(Debug, Clone, Copy)]
pub struct DirectRequestInput {
    pub tutor_id: Uuid,
    pub subject: Subject,
    pub level: ClassLevel,
    pub slot: SlotRef,
    pub date: DateTime<Utc>,
}

/// Broadcast call payload, already validated by the handler.
#[derive(Debug, Clone, Copy)]
pub struct BroadcastInput {
    pub subject: Subject,
    pub level: ClassLevel,
    pub slot: SlotRef,
    pub date: DateTime<Utc>,
}

/// Matching service trait for dependency injection.
#[async_trait]
pub trait MatchingService: Send + Sync {
    /// Tutors eligible for the query, requester excluded. An empty
    /// result is a normal answer, not an error.
    async fn find_tutors(&self, requester: Uuid, query: MatchQuery) -> AppResult<Vec<TutorCard>>;

    /// Create a PENDING request aimed at one tutor
    async fn create_direct_request(
        &self,
        student_id: Uuid,
        input: DirectRequestInput,
    ) -> AppResult<RequestView>;

    /// Fan a request out to every eligible tutor, all or nothing
    async fn create_broadcast_call(
        &self,
        student_id: Uuid,
        input: BroadcastInput,
    ) -> AppResult<BroadcastOutcome>;

    /// Change a request's status; only its designated tutor may do so
    async fn update_request_status(
        &self,
        actor: Uuid,
        request_id: Uuid,
        status: RequestStatus,
    ) -> AppResult<StatusView>;

    /// Requests where the user is the student (tutore) or the
    /// designated tutor (tutorant), newest first
    async fn list_requests(&self, user_id: Uuid, mode: RequestMode) -> AppResult<Vec<RequestView>>;
}

/// Concrete implementation of MatchingService using Unit of Work.
pub struct Matchmaker<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> Matchmaker<U> {
    /// Create new matching service instance with Unit of Work
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
impl<U: UnitOfWork> MatchingService for Matchmaker<U> {
    async fn find_tutors(&self, requester: Uuid, query: MatchQuery) -> AppResult<Vec<TutorCard>> {
        self.require_user(requester).await?;

        let pool = self.uow.profiles().candidate_pool().await?;
        let matched = filter_eligible(&pool, &query, requester);

        tracing::debug!(
            requester = %requester,
            subject = %query.subject,
            slot = %query.slot,
            matched = matched.len(),
            "Eligibility filter ran"
        );

        Ok(matched
            .into_iter()
            .map(|candidate| TutorCard::from(&candidate.user))
            .collect())
    }

    async fn create_direct_request(
        &self,
        student_id: Uuid,
        input: DirectRequestInput,
    ) -> AppResult<RequestView> {
        if input.tutor_id == student_id {
            return Err(AppError::SelfTarget);
        }

        let (student, tutor) = parallel::join2(
            self.require_user(student_id),
            self.require_user(input.tutor_id),
        )
        .await?;

        let request = self
            .uow
            .transaction(move |tx| {
                Box::pin(async move {
                    // Known tutor, so the conversation is established eagerly
                    // and the request carries its id from the start
                    let conversation = tx
                        .conversations()
                        .get_or_create(student.id, tutor.id, None)
                        .await?;

                    let request = tx
                        .requests()
                        .insert(NewRequest {
                            student_id: student.id,
                            tutor_id: tutor.id,
                            subject: input.subject,
                            level: input.level,
                            slot: input.slot,
                            date: input.date,
                            is_broadcast: false,
                            conversation_id: Some(conversation.id),
                        })
                        .await?;

                    tx.notifications()
                        .insert(NewNotification::new_request(
                            tutor.id,
                            &student,
                            input.subject,
                        ))
                        .await?;

                    Ok(request)
                })
            })
            .await?;

        tracing::info!(
            request_id = %request.id,
            student_id = %student_id,
            tutor_id = %input.tutor_id,
            "Direct tutoring request created"
        );

        Ok(RequestView::from(request))
    }

    async fn create_broadcast_call(
        &self,
        student_id: Uuid,
        input: BroadcastInput,
    ) -> AppResult<BroadcastOutcome> {
        self.require_user(student_id).await?;

        let query = MatchQuery {
            subject: input.subject,
            level: input.level,
            slot: input.slot,
        };

        let pool = self.uow.profiles().candidate_pool().await?;
        let tutor_ids: Vec<Uuid> = filter_eligible(&pool, &query, student_id)
            .into_iter()
            .map(|candidate| candidate.user.id)
            .collect();

        // Fail before any write: an empty fan-out is an error, not a no-op
        if tutor_ids.is_empty() {
            return Err(AppError::NoEligibleTutor);
        }

        let ids = tutor_ids.clone();
        let count = self
            .uow
            .transaction(move |tx| {
                Box::pin(async move {
                    let requests = ids
                        .iter()
                        .map(|tutor_id| NewRequest {
                            student_id,
                            tutor_id: *tutor_id,
                            subject: input.subject,
                            level: input.level,
                            slot: input.slot,
                            date: input.date,
                            is_broadcast: true,
                            conversation_id: None,
                        })
                        .collect();
                    let count = tx.requests().insert_many(requests).await?;

                    let notifications = ids
                        .iter()
                        .map(|tutor_id| {
                            NewNotification::broadcast_call(*tutor_id, input.subject, input.slot)
                        })
                        .collect();
                    tx.notifications().insert_many(notifications).await?;

                    Ok(count)
                })
            })
            .await?;

        tracing::info!(
            student_id = %student_id,
            subject = %input.subject,
            slot = %input.slot,
            count = count,
            "Broadcast call sent"
        );

        Ok(BroadcastOutcome {
            message: format!("Appel envoyé à {} tuteurs", count),
            count,
            notified_tutor_ids: tutor_ids,
        })
    }

    async fn update_request_status(
        &self,
        actor: Uuid,
        request_id: Uuid,
        status: RequestStatus,
    ) -> AppResult<StatusView> {
        let request = self
            .uow
            .requests()
            .find_by_id(request_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if request.tutor_id != actor {
            return Err(AppError::Forbidden);
        }

        let updated = self
            .uow
            .transaction(move |tx| {
                Box::pin(async move {
                    let updated = tx.requests().set_status(request_id, status).await?;

                    if status == RequestStatus::Accepted {
                        tx.notifications()
                            .insert(NewNotification::request_accepted(
                                request.student_id,
                                request.subject,
                            ))
                            .await?;

                        // Broadcast requests have no conversation yet; give
                        // the pair one now and link it both ways
                        if updated.conversation_id.is_none() {
                            let conversation = tx
                                .conversations()
                                .get_or_create(
                                    request.student_id,
                                    request.tutor_id,
                                    Some(request_id),
                                )
                                .await?;

                            if conversation.request_id.is_none() {
                                tx.conversations()
                                    .link_request(conversation.id, request_id)
                                    .await?;
                            }
                            tx.requests()
                                .link_conversation(request_id, conversation.id)
                                .await?;
                        }
                    }

                    Ok(updated)
                })
            })
            .await?;

        tracing::info!(
            request_id = %request_id,
            status = %status,
            "Request status updated"
        );

        Ok(StatusView {
            id: updated.id,
            status,
        })
    }

    async fn list_requests(&self, user_id: Uuid, mode: RequestMode) -> AppResult<Vec<RequestView>> {
        let requests = match mode {
            RequestMode::Tutore => self.uow.requests().list_for_student(user_id).await?,
            RequestMode::Tutorant => self.uow.requests().list_for_tutor(user_id).await?,
        };

        // One lookup for every party on both sides
        let mut ids: Vec<Uuid> = requests
            .iter()
            .flat_map(|r| [r.student_id, r.tutor_id])
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let parties: HashMap<Uuid, RequestParty> = self
            .uow
            .users()
            .find_many(ids)
            .await?
            .iter()
            .map(|user| (user.id, RequestParty::from(user)))
            .collect();

        Ok(requests
            .into_iter()
            .map(|request| {
                let student = parties.get(&request.student_id).cloned();
                let tutor = parties.get(&request.tutor_id).cloned();
                let mut view = RequestView::from(request);
                view.student = student;
                view.tutor = tutor;
                view
            })
            .collect())
    }
}
