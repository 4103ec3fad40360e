//! Abuse reporting and moderation handlers.
//!
//! Filing a report is open to any verified user. The triage routes are
//! role-gated in the handlers so an ordinary student gets a 403, not a
//! missing route.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, patch, post},
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_moderator, CurrentUser};
use crate::api::AppState;
use crate::domain::{NewReport, ReportStatus};
use crate::errors::AppResult;
use crate::services::{ConversationTranscript, ReportOverview, ReportStatusView, ReportView};

/// Abuse report submission
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReportRequest {
    /// Reported conversation, if the report targets a whole thread
    pub conversation_id: Option<Uuid>,
    /// Reported message, if the report targets one message
    pub message_id: Option<Uuid>,
    /// Short category, e.g. "harcèlement"
    #[validate(length(min = 1, message = "Reason is required"))]
    #[schema(example = "harcèlement")]
    pub reason: String,
    /// What happened, in the reporter's words
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
}

/// Report triage status change
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateReportRequest {
    /// New triage status
    pub status: ReportStatus,
}

/// All filed reports, for the moderation desk
#[derive(Debug, Serialize, ToSchema)]
pub struct ReportsResponse {
    pub reports: Vec<ReportOverview>,
}

/// Create the reporting route, open to any verified user
pub fn report_routes() -> Router<AppState> {
    Router::new().route("/abuse-reports", post(create_report))
}

/// Create the triage routes, restricted to moderators
pub fn triage_routes() -> Router<AppState> {
    Router::new()
        .route("/reports", get(list_reports))
        .route("/reports/:id", patch(update_report))
        .route("/conversations/:id", get(inspect_conversation))
}

/// File an abuse report
#[utoipa::path(
    post,
    path = "/api/mod/abuse-reports",
    tag = "Moderation",
    security(("bearer_auth" = [])),
    request_body = CreateReportRequest,
    responses(
        (status = 201, description = "Report filed and moderators alerted", body = ReportView),
        (status = 400, description = "No target or missing reason")
    )
)]
pub async fn create_report(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateReportRequest>,
) -> AppResult<(StatusCode, Json<ReportView>)> {
    let report = state
        .moderation_service
        .report_abuse(
            current_user.id,
            NewReport {
                conversation_id: payload.conversation_id,
                message_id: payload.message_id,
                reason: payload.reason,
                description: payload.description,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(report)))
}

/// List all abuse reports
#[utoipa::path(
    get,
    path = "/api/mod/reports",
    tag = "Moderation",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Reports, newest first", body = ReportsResponse),
        (status = 403, description = "Caller is not a moderator")
    )
)]
pub async fn list_reports(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<ReportsResponse>> {
    require_moderator(&current_user)?;

    let reports = state.moderation_service.list_reports().await?;

    Ok(Json(ReportsResponse { reports }))
}

/// Change a report's triage status
#[utoipa::path(
    patch,
    path = "/api/mod/reports/{id}",
    tag = "Moderation",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Report id")),
    request_body = UpdateReportRequest,
    responses(
        (status = 200, description = "Status changed", body = ReportStatusView),
        (status = 403, description = "Caller is not a moderator"),
        (status = 404, description = "Unknown report")
    )
)]
pub async fn update_report(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateReportRequest>,
) -> AppResult<Json<ReportStatusView>> {
    require_moderator(&current_user)?;

    let status = state
        .moderation_service
        .update_report_status(id, payload.status)
        .await?;

    Ok(Json(status))
}

/// Read a full conversation transcript
#[utoipa::path(
    get,
    path = "/api/mod/conversations/{id}",
    tag = "Moderation",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "Participants, context and every message", body = ConversationTranscript),
        (status = 403, description = "Caller is not a moderator"),
        (status = 404, description = "Unknown conversation")
    )
)]
pub async fn inspect_conversation(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ConversationTranscript>> {
    require_moderator(&current_user)?;

    let transcript = state.moderation_service.inspect_conversation(id).await?;

    Ok(Json(transcript))
}
