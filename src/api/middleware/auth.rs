//! JWT authentication and verification middleware.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::api::AppState;
use crate::config::{BEARER_TOKEN_PREFIX, ROLE_MODERATOR};
use crate::errors::AppError;

/// Authenticated user extracted from JWT token
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}

impl CurrentUser {
    /// Check if user has moderator role.
    pub fn is_moderator(&self) -> bool {
        self.role == ROLE_MODERATOR
    }
}

/// JWT authentication middleware.
///
/// Extracts and validates the JWT token from the Authorization header,
/// then injects the CurrentUser into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix(BEARER_TOKEN_PREFIX)
        .ok_or(AppError::Unauthorized)?;

    let claims = state.auth_service.verify_token(token)?;

    let current_user = CurrentUser {
        id: claims.sub,
        email: claims.email,
        role: claims.role,
    };

    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}

/// Verified email middleware. Must run after `auth_middleware`.
///
/// Re-checks the account against the database, so revoking
/// verification takes effect on the next request, not at token expiry.
pub async fn require_verified(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let current_user = request
        .extensions()
        .get::<CurrentUser>()
        .cloned()
        .ok_or(AppError::Unauthorized)?;

    state.auth_service.ensure_verified(current_user.id).await?;

    Ok(next.run(request).await)
}

/// Require moderator role, returns Forbidden error if not a moderator.
pub fn require_moderator(user: &CurrentUser) -> Result<(), AppError> {
    if user.is_moderator() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}
