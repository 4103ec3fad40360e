//! Authentication handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{ClassLevel, UserResponse};
use crate::errors::{AppError, AppResult};
use crate::services::{AuthSession, RegisterInput};
use crate::types::MessageResponse;

/// Account registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Account email address
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "lucas@lycee.fr")]
    pub email: String,
    /// Password (minimum 8 characters)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,
    /// First name
    #[validate(length(min = 1, message = "First name is required"))]
    #[schema(example = "Lucas")]
    pub first_name: String,
    /// Last name
    #[validate(length(min = 1, message = "Last name is required"))]
    #[schema(example = "Moreau")]
    pub last_name: String,
    /// Class level as displayed to students
    #[schema(example = "2nde")]
    pub class_level: String,
    /// Subjects the student is strong in, shown on their profile
    #[serde(default)]
    pub specialties: Vec<String>,
    /// Chosen specialty options
    #[serde(default)]
    pub options: Vec<String>,
    /// Avatar image URL
    pub avatar_url: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Account email address
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "lucas@lycee.fr")]
    pub email: String,
    /// Account password
    #[schema(example = "SecurePass123!")]
    pub password: String,
}

/// Email verification request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyEmailRequest {
    /// Opaque token from the verification email
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
}

/// Resend verification email request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResendVerificationRequest {
    /// Account email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Password reset link request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    /// Account email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Password reset request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    /// Opaque token from the reset email
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
    /// New password (minimum 8 characters)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Create public authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/verify-email", post(verify_email))
        .route("/resend-verification", post(resend_verification))
        .route("/request-password-reset", post(request_password_reset))
        .route("/reset-password", post(reset_password))
}

/// Create account routes, mounted behind the auth middleware
pub fn account_routes() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created, verification email sent", body = AuthSession),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthSession>)> {
    let class_level = ClassLevel::parse_wire(&payload.class_level).ok_or_else(|| {
        AppError::validation(format!("Unknown class level: {}", payload.class_level))
    })?;

    let session = state
        .auth_service
        .register(RegisterInput {
            email: payload.email,
            password: payload.password,
            first_name: payload.first_name,
            last_name: payload.last_name,
            class_level,
            specialties: payload.specialties,
            options: payload.options,
            avatar_url: payload.avatar_url,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(session)))
}

/// Login and get a bearer token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthSession),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<AuthSession>> {
    let session = state
        .auth_service
        .login(payload.email, payload.password)
        .await?;

    Ok(Json(session))
}

/// Confirm an email address with a mailed token
#[utoipa::path(
    post,
    path = "/api/auth/verify-email",
    tag = "Authentication",
    request_body = VerifyEmailRequest,
    responses(
        (status = 200, description = "Email verified", body = MessageResponse),
        (status = 400, description = "Invalid or expired token")
    )
)]
pub async fn verify_email(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<VerifyEmailRequest>,
) -> AppResult<Json<MessageResponse>> {
    state.auth_service.verify_email(payload.token).await?;

    Ok(Json(MessageResponse::new("Email vérifié avec succès")))
}

/// Send a fresh verification email
#[utoipa::path(
    post,
    path = "/api/auth/resend-verification",
    tag = "Authentication",
    request_body = ResendVerificationRequest,
    responses(
        (status = 200, description = "Verification email sent", body = MessageResponse),
        (status = 400, description = "Email already verified"),
        (status = 404, description = "Unknown email address")
    )
)]
pub async fn resend_verification(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ResendVerificationRequest>,
) -> AppResult<Json<MessageResponse>> {
    state.auth_service.resend_verification(payload.email).await?;

    Ok(Json(MessageResponse::new("Email de vérification envoyé")))
}

/// Request a password reset link
#[utoipa::path(
    post,
    path = "/api/auth/request-password-reset",
    tag = "Authentication",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Same response whether or not the email exists", body = MessageResponse)
    )
)]
pub async fn request_password_reset(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ForgotPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .auth_service
        .request_password_reset(payload.email)
        .await?;

    Ok(Json(MessageResponse::new(
        "Si cet email existe, un lien de réinitialisation a été envoyé",
    )))
}

/// Set a new password with a mailed token
#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    tag = "Authentication",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, description = "Invalid or expired token")
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .auth_service
        .reset_password(payload.token, payload.new_password)
        .await?;

    Ok(Json(MessageResponse::new(
        "Mot de passe réinitialisé avec succès",
    )))
}

/// Get the authenticated account
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current account", body = UserResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn me(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<UserResponse>> {
    let user = state.auth_service.me(current_user.id).await?;

    Ok(Json(user))
}
