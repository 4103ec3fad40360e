//! Matching and tutoring request handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, patch, post},
    Extension, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{ClassLevel, MatchQuery, RequestMode, RequestStatus, SlotRef, Subject};
use crate::errors::{AppError, AppResult};
use crate::services::{
    BroadcastInput, BroadcastOutcome, DirectRequestInput, RequestView, StatusView, TutorCard,
};

/// Match query parameters
#[derive(Debug, Deserialize)]
pub struct MatchParams {
    /// Canonical subject name
    pub subject: String,
    /// Level as displayed to students
    pub level: String,
    /// Slot id like Lundi_S3
    #[serde(rename = "slotId")]
    pub slot_id: String,
}

/// Request listing parameters
#[derive(Debug, Deserialize)]
pub struct ListRequestsParams {
    /// "tutore" for requests sent, "tutorant" for requests received
    pub mode: String,
}

/// Direct tutoring request creation
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRequestRequest {
    /// The tutor the request is addressed to
    pub tutor_id: Uuid,
    /// Canonical subject name
    #[schema(example = "Mathématiques")]
    pub subject: String,
    /// Level help is wanted at, as displayed to students
    #[schema(example = "2nde")]
    pub level: String,
    /// Slot id like Lundi_S3
    #[schema(example = "Lundi_S3")]
    pub slot_id: String,
    /// Concrete session date the slot refers to
    pub date: DateTime<Utc>,
}

/// Broadcast call creation
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BroadcastCallRequest {
    /// Canonical subject name
    #[schema(example = "Physique-Chimie")]
    pub subject: String,
    /// Level help is wanted at, as displayed to students
    #[schema(example = "1ère")]
    pub level: String,
    /// Slot id like Lundi_S3
    #[schema(example = "Mardi_M4")]
    pub slot_id: String,
    /// Concrete session date the slot refers to
    pub date: DateTime<Utc>,
}

/// Request status change
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStatusRequest {
    /// New lifecycle status
    pub status: RequestStatus,
}

/// Eligible tutors for a match query
#[derive(Debug, Serialize, ToSchema)]
pub struct TutorsResponse {
    pub tutors: Vec<TutorCard>,
}

/// The caller's requests, one side of the exchange
#[derive(Debug, Serialize, ToSchema)]
pub struct RequestsResponse {
    pub requests: Vec<RequestView>,
}

/// Create matching and request routes
pub fn matching_routes() -> Router<AppState> {
    Router::new()
        .route("/match", get(find_tutors))
        .route("/requests", get(list_requests).post(create_request))
        .route("/requests/:id/status", patch(update_request_status))
        .route("/calls", post(broadcast_call))
}

fn parse_subject(raw: &str) -> AppResult<Subject> {
    raw.parse()
}

fn parse_level(raw: &str) -> AppResult<ClassLevel> {
    ClassLevel::parse_wire(raw)
        .ok_or_else(|| AppError::validation(format!("Unknown class level: {}", raw)))
}

/// Find eligible tutors for a subject, level and slot
#[utoipa::path(
    get,
    path = "/api/match",
    tag = "Matching",
    security(("bearer_auth" = [])),
    params(
        ("subject" = String, Query, description = "Canonical subject name"),
        ("level" = String, Query, description = "Level as displayed to students"),
        ("slotId" = String, Query, description = "Slot id like Lundi_S3")
    ),
    responses(
        (status = 200, description = "Eligible tutors, possibly empty", body = TutorsResponse),
        (status = 400, description = "Unknown subject, level or slot")
    )
)]
pub async fn find_tutors(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(params): Query<MatchParams>,
) -> AppResult<Json<TutorsResponse>> {
    let query = MatchQuery {
        subject: parse_subject(&params.subject)?,
        level: parse_level(&params.level)?,
        slot: params.slot_id.parse::<SlotRef>()?,
    };

    let tutors = state
        .matching_service
        .find_tutors(current_user.id, query)
        .await?;

    Ok(Json(TutorsResponse { tutors }))
}

/// Send a tutoring request to one tutor
#[utoipa::path(
    post,
    path = "/api/requests",
    tag = "Matching",
    security(("bearer_auth" = [])),
    request_body = CreateRequestRequest,
    responses(
        (status = 201, description = "Request created and tutor notified", body = RequestView),
        (status = 400, description = "Validation error or self-target"),
        (status = 404, description = "Unknown tutor")
    )
)]
pub async fn create_request(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateRequestRequest>,
) -> AppResult<(StatusCode, Json<RequestView>)> {
    let input = DirectRequestInput {
        tutor_id: payload.tutor_id,
        subject: parse_subject(&payload.subject)?,
        level: parse_level(&payload.level)?,
        slot: payload.slot_id.parse::<SlotRef>()?,
        date: payload.date,
    };

    let request = state
        .matching_service
        .create_direct_request(current_user.id, input)
        .await?;

    Ok((StatusCode::CREATED, Json(request)))
}

/// List the caller's requests for one side of the exchange
#[utoipa::path(
    get,
    path = "/api/requests",
    tag = "Matching",
    security(("bearer_auth" = [])),
    params(
        ("mode" = String, Query, description = "\"tutore\" for requests sent, \"tutorant\" for requests received")
    ),
    responses(
        (status = 200, description = "Requests, newest first", body = RequestsResponse),
        (status = 400, description = "Unknown mode")
    )
)]
pub async fn list_requests(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(params): Query<ListRequestsParams>,
) -> AppResult<Json<RequestsResponse>> {
    let mode: RequestMode = params.mode.parse()?;

    let requests = state
        .matching_service
        .list_requests(current_user.id, mode)
        .await?;

    Ok(Json(RequestsResponse { requests }))
}

/// Change the status of a request addressed to the caller
#[utoipa::path(
    patch,
    path = "/api/requests/{id}/status",
    tag = "Matching",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Request id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = StatusView),
        (status = 403, description = "Caller is not the designated tutor"),
        (status = 404, description = "Unknown request")
    )
)]
pub async fn update_request_status(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateStatusRequest>,
) -> AppResult<Json<StatusView>> {
    let status = state
        .matching_service
        .update_request_status(current_user.id, id, payload.status)
        .await?;

    Ok(Json(status))
}

/// Fan a call for help out to every eligible tutor
#[utoipa::path(
    post,
    path = "/api/calls",
    tag = "Matching",
    security(("bearer_auth" = [])),
    request_body = BroadcastCallRequest,
    responses(
        (status = 200, description = "Call sent to every eligible tutor", body = BroadcastOutcome),
        (status = 404, description = "No eligible tutor for this slot")
    )
)]
pub async fn broadcast_call(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<BroadcastCallRequest>,
) -> AppResult<Json<BroadcastOutcome>> {
    let input = BroadcastInput {
        subject: parse_subject(&payload.subject)?,
        level: parse_level(&payload.level)?,
        slot: payload.slot_id.parse::<SlotRef>()?,
        date: payload.date,
    };

    let outcome = state
        .matching_service
        .create_broadcast_call(current_user.id, input)
        .await?;

    Ok(Json(outcome))
}
