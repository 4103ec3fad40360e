//! Notification feed handlers.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, patch},
    Extension, Router,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::errors::AppResult;
use crate::services::NotificationView;

/// The caller's notification feed
#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationsResponse {
    pub notifications: Vec<NotificationView>,
}

/// Create notification routes
pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/:id/read", patch(mark_notification_read))
}

/// List the caller's notifications
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Notifications, newest first", body = NotificationsResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<NotificationsResponse>> {
    let notifications = state.notification_service.list(current_user.id).await?;

    Ok(Json(NotificationsResponse { notifications }))
}

/// Mark one notification as read
#[utoipa::path(
    patch,
    path = "/api/notifications/{id}/read",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Notification id")),
    responses(
        (status = 200, description = "The notification, now read", body = NotificationView),
        (status = 404, description = "Unknown notification or not the owner")
    )
)]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<NotificationView>> {
    let notification = state
        .notification_service
        .mark_read(current_user.id, id)
        .await?;

    Ok(Json(notification))
}
