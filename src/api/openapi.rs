//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    auth_handler, matching_handler, messaging_handler, moderation_handler, notification_handler,
    tutorant_handler,
};
use crate::domain::{
    NotificationKind, ReportStatus, RequestStatus, Subject, UserCard, UserResponse, UserRole,
};
use crate::services::{
    AuthSession, AvailabilityView, BroadcastOutcome, ConversationOverview, ConversationTranscript,
    ConversationView, ExceptionView, MessagePreview, MessageView, NotificationView,
    ParticipantDetail, PreferencesView, ReportOverview, ReportStatusView, ReportView,
    ReportedConversation, ReporterCard, RequestContext, RequestParty, RequestSummary, RequestView,
    StatusView, TokenResponse, TranscriptMessage, TutorCard,
};
use crate::types::MessageResponse;

/// OpenAPI documentation for the Agora tutoring API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Agora",
        version = "0.1.0",
        description = "Peer tutoring for the lycée: matchmaking, requests, messaging and moderation",
        contact(name = "API Support", email = "support@lycee.fr")
    ),
    servers(
        (url = "http://localhost:3001", description = "Local development server")
    ),
    paths(
        // Authentication endpoints
        auth_handler::register,
        auth_handler::login,
        auth_handler::verify_email,
        auth_handler::resend_verification,
        auth_handler::request_password_reset,
        auth_handler::reset_password,
        auth_handler::me,
        // Tutor profile endpoints
        tutorant_handler::get_preferences,
        tutorant_handler::update_preferences,
        tutorant_handler::get_availability,
        tutorant_handler::update_availability,
        tutorant_handler::add_exception,
        tutorant_handler::set_enabled,
        // Matching and request endpoints
        matching_handler::find_tutors,
        matching_handler::create_request,
        matching_handler::list_requests,
        matching_handler::update_request_status,
        matching_handler::broadcast_call,
        // Messaging endpoints
        messaging_handler::list_conversations,
        messaging_handler::open_conversation,
        messaging_handler::list_messages,
        messaging_handler::send_message,
        messaging_handler::mark_read,
        // Notification endpoints
        notification_handler::list_notifications,
        notification_handler::mark_notification_read,
        // Moderation endpoints
        moderation_handler::create_report,
        moderation_handler::list_reports,
        moderation_handler::update_report,
        moderation_handler::inspect_conversation,
    ),
    components(
        schemas(
            // Domain types
            UserRole,
            UserCard,
            UserResponse,
            Subject,
            RequestStatus,
            ReportStatus,
            NotificationKind,
            // Auth types
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            auth_handler::VerifyEmailRequest,
            auth_handler::ResendVerificationRequest,
            auth_handler::ForgotPasswordRequest,
            auth_handler::ResetPasswordRequest,
            TokenResponse,
            AuthSession,
            MessageResponse,
            // Tutor profile types
            tutorant_handler::UpdatePreferencesRequest,
            tutorant_handler::UpdateAvailabilityRequest,
            tutorant_handler::AddExceptionRequest,
            tutorant_handler::SetEnabledRequest,
            tutorant_handler::EnabledView,
            PreferencesView,
            ExceptionView,
            AvailabilityView,
            // Matching types
            matching_handler::CreateRequestRequest,
            matching_handler::BroadcastCallRequest,
            matching_handler::UpdateStatusRequest,
            matching_handler::TutorsResponse,
            matching_handler::RequestsResponse,
            TutorCard,
            RequestParty,
            RequestView,
            StatusView,
            BroadcastOutcome,
            // Messaging types
            messaging_handler::OpenConversationRequest,
            messaging_handler::SendMessageRequest,
            messaging_handler::ConversationsResponse,
            messaging_handler::MessagesResponse,
            messaging_handler::ReadReceipt,
            ConversationView,
            ConversationOverview,
            RequestSummary,
            MessagePreview,
            MessageView,
            // Notification types
            notification_handler::NotificationsResponse,
            NotificationView,
            // Moderation types
            moderation_handler::CreateReportRequest,
            moderation_handler::UpdateReportRequest,
            moderation_handler::ReportsResponse,
            ReportView,
            ReporterCard,
            ReportedConversation,
            ReportOverview,
            ReportStatusView,
            ParticipantDetail,
            RequestContext,
            TranscriptMessage,
            ConversationTranscript,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Account registration, login and email flows"),
        (name = "Tutorant", description = "Tutoring offer, weekly availability and exceptions"),
        (name = "Matching", description = "Tutor search, direct requests and broadcast calls"),
        (name = "Messaging", description = "Conversations between matched students"),
        (name = "Notifications", description = "In-app notification feed"),
        (name = "Moderation", description = "Abuse reports and moderator triage")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /api/auth/login"))
                        .build(),
                ),
            );
        }
    }
}
