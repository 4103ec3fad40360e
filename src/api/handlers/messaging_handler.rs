//! Conversation and messaging handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::errors::AppResult;
use crate::services::{ConversationOverview, ConversationView, MessageView};

/// Conversation opening request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct OpenConversationRequest {
    /// The other participant
    pub participant_id: Uuid,
    /// Request that spawned the conversation, if any
    pub request_id: Option<Uuid>,
}

/// Message sending request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SendMessageRequest {
    /// Message body; must not be blank
    #[validate(length(min = 1, max = 2000, message = "Message must be 1 to 2000 characters"))]
    #[schema(example = "Bonjour, je peux t'aider en maths mardi", max_length = 2000)]
    pub content: String,
}

/// The viewer's conversation list
#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationsResponse {
    pub conversations: Vec<ConversationOverview>,
}

/// Message history of one conversation
#[derive(Debug, Serialize, ToSchema)]
pub struct MessagesResponse {
    pub messages: Vec<MessageView>,
}

/// Read receipt acknowledgement
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadReceipt {
    /// How many messages were flipped to read
    pub count: u64,
}

/// Create conversation and messaging routes
pub fn messaging_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/conversations",
            get(list_conversations).post(open_conversation),
        )
        .route(
            "/conversations/:id/messages",
            get(list_messages).post(send_message),
        )
        .route("/conversations/:id/read", post(mark_read))
}

/// List the caller's conversations
#[utoipa::path(
    get,
    path = "/api/conversations",
    tag = "Messaging",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Conversations, most recently active first", body = ConversationsResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_conversations(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<ConversationsResponse>> {
    let conversations = state
        .messaging_service
        .list_conversations(current_user.id)
        .await?;

    Ok(Json(ConversationsResponse { conversations }))
}

/// Open (or return) the conversation with another user
#[utoipa::path(
    post,
    path = "/api/conversations",
    tag = "Messaging",
    security(("bearer_auth" = [])),
    request_body = OpenConversationRequest,
    responses(
        (status = 200, description = "The conversation for this pair", body = ConversationView),
        (status = 400, description = "Cannot open a conversation with yourself"),
        (status = 404, description = "Unknown participant")
    )
)]
pub async fn open_conversation(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<OpenConversationRequest>,
) -> AppResult<Json<ConversationView>> {
    let conversation = state
        .messaging_service
        .open_conversation(current_user.id, payload.participant_id, payload.request_id)
        .await?;

    Ok(Json(conversation))
}

/// Full message history of a conversation
#[utoipa::path(
    get,
    path = "/api/conversations/{id}/messages",
    tag = "Messaging",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "Messages, oldest first", body = MessagesResponse),
        (status = 403, description = "Caller is not a participant"),
        (status = 404, description = "Unknown conversation")
    )
)]
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessagesResponse>> {
    let messages = state.messaging_service.messages(current_user.id, id).await?;

    Ok(Json(MessagesResponse { messages }))
}

/// Send a message in a conversation
#[utoipa::path(
    post,
    path = "/api/conversations/{id}/messages",
    tag = "Messaging",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Conversation id")),
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message stored", body = MessageView),
        (status = 400, description = "Blank or oversized message"),
        (status = 403, description = "Caller is not a participant"),
        (status = 404, description = "Unknown conversation")
    )
)]
pub async fn send_message(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<SendMessageRequest>,
) -> AppResult<(StatusCode, Json<MessageView>)> {
    let message = state
        .messaging_service
        .send_message(current_user.id, id, payload.content)
        .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

/// Mark the other participant's messages as read
#[utoipa::path(
    post,
    path = "/api/conversations/{id}/read",
    tag = "Messaging",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "How many messages were marked", body = ReadReceipt),
        (status = 403, description = "Caller is not a participant"),
        (status = 404, description = "Unknown conversation")
    )
)]
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ReadReceipt>> {
    let count = state
        .messaging_service
        .mark_read(current_user.id, id)
        .await?;

    Ok(Json(ReadReceipt { count }))
}
