//! Tutor profile and availability handlers.
//!
//! Everything here edits the caller's own offer; there is no way to
//! touch another user's profile through these routes.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, patch, post, put},
    Extension, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{
    ClassLevel, LevelSet, NewException, SlotRef, Subject, SubjectSet, TutorPreferences,
    WeekSchedule,
};
use crate::errors::{AppError, AppResult};
use crate::services::{AvailabilityView, ExceptionView, PreferencesView};

/// Tutoring offer update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePreferencesRequest {
    /// Subjects offered, canonical names
    #[schema(example = json!(["Mathématiques", "Physique-Chimie"]))]
    pub subjects: Vec<String>,
    /// Accepted student levels, as displayed to students
    #[schema(example = json!(["2nde", "1ère"]))]
    pub levels: Vec<String>,
    /// Whether sessions outside school hours are fine
    pub available_outside_hours: bool,
}

/// Weekly grid replacement request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAvailabilityRequest {
    /// Slot ids of the new grid; replaces the previous grid entirely
    #[schema(example = json!(["Lundi_S3", "Mardi_M1"]))]
    pub available_slots: Vec<String>,
}

/// Dated exception request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddExceptionRequest {
    /// Day the exception applies to
    pub date: DateTime<Utc>,
    /// False marks an absence, true marks extra availability
    pub is_available: bool,
    /// Optional free-text reason
    #[schema(example = "Stage en entreprise")]
    pub reason: Option<String>,
}

/// Tutoring switch request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetEnabledRequest {
    pub enabled: bool,
}

/// Tutoring switch state
#[derive(Debug, Serialize, ToSchema)]
pub struct EnabledView {
    pub enabled: bool,
}

/// Create tutor profile routes
pub fn tutorant_routes() -> Router<AppState> {
    Router::new()
        .route("/preferences", get(get_preferences).put(update_preferences))
        .route(
            "/availability",
            get(get_availability).put(update_availability),
        )
        .route("/exceptions", post(add_exception))
        .route("/enabled", patch(set_enabled))
}

fn parse_subjects(raw: &[String]) -> AppResult<SubjectSet> {
    raw.iter().map(|s| s.parse::<Subject>()).collect()
}

fn parse_levels(raw: &[String]) -> AppResult<LevelSet> {
    raw.iter()
        .map(|s| {
            ClassLevel::parse_wire(s)
                .ok_or_else(|| AppError::validation(format!("Unknown class level: {}", s)))
        })
        .collect()
}

/// Get the caller's tutoring offer
#[utoipa::path(
    get,
    path = "/api/tutorant/preferences",
    tag = "Tutorant",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current offer, empty if never saved", body = PreferencesView),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn get_preferences(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<PreferencesView>> {
    let preferences = state.profile_service.preferences(current_user.id).await?;

    Ok(Json(preferences))
}

/// Save the caller's tutoring offer
#[utoipa::path(
    put,
    path = "/api/tutorant/preferences",
    tag = "Tutorant",
    security(("bearer_auth" = [])),
    request_body = UpdatePreferencesRequest,
    responses(
        (status = 200, description = "Offer saved", body = PreferencesView),
        (status = 400, description = "Unknown subject or level")
    )
)]
pub async fn update_preferences(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<UpdatePreferencesRequest>,
) -> AppResult<Json<PreferencesView>> {
    let prefs = TutorPreferences {
        subjects: parse_subjects(&payload.subjects)?,
        levels: parse_levels(&payload.levels)?,
        available_outside_hours: payload.available_outside_hours,
    };

    let preferences = state
        .profile_service
        .update_preferences(current_user.id, prefs)
        .await?;

    Ok(Json(preferences))
}

/// Get the caller's weekly grid and exceptions
#[utoipa::path(
    get,
    path = "/api/tutorant/availability",
    tag = "Tutorant",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Weekly grid plus exceptions", body = AvailabilityView),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn get_availability(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<AvailabilityView>> {
    let availability = state.profile_service.availability(current_user.id).await?;

    Ok(Json(availability))
}

/// Replace the caller's weekly grid
#[utoipa::path(
    put,
    path = "/api/tutorant/availability",
    tag = "Tutorant",
    security(("bearer_auth" = [])),
    request_body = UpdateAvailabilityRequest,
    responses(
        (status = 200, description = "Grid replaced", body = AvailabilityView),
        (status = 400, description = "Malformed slot id")
    )
)]
pub async fn update_availability(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<UpdateAvailabilityRequest>,
) -> AppResult<Json<AvailabilityView>> {
    let week: WeekSchedule = payload
        .available_slots
        .iter()
        .map(|s| s.parse::<SlotRef>())
        .collect::<AppResult<_>>()?;

    let availability = state
        .profile_service
        .replace_availability(current_user.id, week)
        .await?;

    Ok(Json(availability))
}

/// Declare a dated availability exception
#[utoipa::path(
    post,
    path = "/api/tutorant/exceptions",
    tag = "Tutorant",
    security(("bearer_auth" = [])),
    request_body = AddExceptionRequest,
    responses(
        (status = 201, description = "Exception recorded", body = ExceptionView),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn add_exception(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<AddExceptionRequest>,
) -> AppResult<(StatusCode, Json<ExceptionView>)> {
    let exception = state
        .profile_service
        .add_exception(
            current_user.id,
            NewException {
                date: payload.date,
                is_available: payload.is_available,
                reason: payload.reason,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(exception)))
}

/// Flip the caller's tutoring switch
#[utoipa::path(
    patch,
    path = "/api/tutorant/enabled",
    tag = "Tutorant",
    security(("bearer_auth" = [])),
    request_body = SetEnabledRequest,
    responses(
        (status = 200, description = "New switch state", body = EnabledView),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn set_enabled(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<SetEnabledRequest>,
) -> AppResult<Json<EnabledView>> {
    let enabled = state
        .profile_service
        .set_enabled(current_user.id, payload.enabled)
        .await?;

    Ok(Json(EnabledView { enabled }))
}
