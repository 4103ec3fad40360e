//! Authentication service - Handles accounts, sessions and email proofs.
//!
//! SOLID (SRP): Handles authentication concerns only.
//! SOLID (ISP): Trait contains only auth methods, password handling in domain.
//! DDD: Uses domain Password value object for hashing.
//! DDD: Uses Unit of Work for repository access.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{
    Config, RESET_TOKEN_TTL_HOURS, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER,
    VERIFICATION_TOKEN_TTL_HOURS,
};
use crate::domain::{ClassLevel, NewUser, Password, User, UserResponse};
use crate::errors::{AppError, AppResult};
use crate::infra::{Mailer, UnitOfWork};

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
}

/// Registration payload, already validated and parsed by the handler.
#[derive(Debug)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub class_level: ClassLevel,
    pub specialties: Vec<String>,
    pub options: Vec<String>,
    pub avatar_url: Option<String>,
}

/// Successful login: the account view plus a bearer token.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthSession {
    pub user: UserResponse,
    pub token: TokenResponse,
}

/// Authentication service trait for dependency injection.
///
/// SOLID (ISP): Contains only authentication operations.
/// Password hashing is handled by domain::Password value object.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new account, send the verification email and open
    /// a session so the client can proceed immediately
    async fn register(&self, input: RegisterInput) -> AppResult<AuthSession>;

    /// Login and return the account plus a JWT token
    async fn login(&self, email: String, password: String) -> AppResult<AuthSession>;

    /// Current account view for an authenticated user
    async fn me(&self, user_id: Uuid) -> AppResult<UserResponse>;

    /// Consume a verification token and mark the email verified
    async fn verify_email(&self, token: String) -> AppResult<()>;

    /// Re-issue the verification token for an unverified account
    async fn resend_verification(&self, email: String) -> AppResult<()>;

    /// Issue a reset token if the email exists. Callers answer with the
    /// same message either way so addresses cannot be probed.
    async fn request_password_reset(&self, email: String) -> AppResult<()>;

    /// Consume a reset token and store the new password
    async fn reset_password(&self, token: String, new_password: String) -> AppResult<()>;

    /// Reject users that have not verified their email yet
    async fn ensure_verified(&self, user_id: Uuid) -> AppResult<()>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

/// Generate JWT token for a user (shared helper to avoid duplication)
fn generate_token(user: &User, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role.to_string(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
    })
}

/// Verify JWT token and extract claims (shared helper)
fn verify_token_internal(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// 32 random bytes, hex encoded. Opaque single-use account token.
fn generate_account_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);

    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{:02x}", byte);
    }
    out
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    mailer: Arc<Mailer>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    /// Create new auth service instance with Unit of Work
    pub fn new(uow: Arc<U>, mailer: Arc<Mailer>, config: Config) -> Self {
        Self {
            uow,
            mailer,
            config,
        }
    }

    /// Tutoring flag shown on account views
    async fn tutoring_enabled(&self, user_id: Uuid) -> AppResult<bool> {
        Ok(self
            .uow
            .profiles()
            .find_by_user(user_id)
            .await?
            .map(|p| p.enabled)
            .unwrap_or(false))
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, input: RegisterInput) -> AppResult<AuthSession> {
        // Email format is validated by the handler's ValidatedJson extractor
        if self.uow.users().find_by_email(&input.email).await?.is_some() {
            return Err(AppError::conflict("User"));
        }

        // DDD: Use Password value object for hashing
        let password_hash = Password::new(&input.password)?.into_string();

        let user = self
            .uow
            .users()
            .create(NewUser::registration(
                input.email,
                password_hash,
                input.first_name,
                input.last_name,
                input.class_level,
                input.specialties,
                input.options,
                input.avatar_url,
            ))
            .await?;

        let token = generate_account_token();
        let expires_at = Utc::now() + Duration::hours(VERIFICATION_TOKEN_TTL_HOURS);
        self.uow
            .tokens()
            .issue_verification(user.id, token.clone(), expires_at)
            .await?;

        self.mailer
            .send_verification_email(&user.email, &token)
            .await?;

        tracing::info!(user_id = %user.id, "Account registered");

        let token = generate_token(&user, &self.config)?;

        // Tutoring is always off until the user opts in
        Ok(AuthSession {
            user: UserResponse::new(user, false),
            token,
        })
    }

    async fn login(&self, email: String, password: String) -> AppResult<AuthSession> {
        let user_result = self.uow.users().find_by_email(&email).await?;

        // SECURITY: Perform password verification even if user doesn't exist
        // to prevent timing attacks that could enumerate valid emails.
        // We use a dummy hash that will always fail verification.
        let dummy_hash =
            "$argon2id$v=19$m=19456,t=2,p=1$dummysalt123456$dummyhash1234567890123456789012";

        let stored_hash = user_result
            .as_ref()
            .map(|u| u.password_hash.as_str())
            .unwrap_or(dummy_hash);

        // DDD: Use Password value object for verification
        let password_valid = Password::from_hash(stored_hash.to_string()).verify(&password);

        let user = match user_result {
            Some(user) if password_valid => user,
            _ => return Err(AppError::InvalidCredentials),
        };

        let token = generate_token(&user, &self.config)?;
        let enabled = self.tutoring_enabled(user.id).await?;

        Ok(AuthSession {
            user: UserResponse::new(user, enabled),
            token,
        })
    }

    async fn me(&self, user_id: Uuid) -> AppResult<UserResponse> {
        let user = self
            .uow
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let enabled = self.tutoring_enabled(user.id).await?;
        Ok(UserResponse::new(user, enabled))
    }

    async fn verify_email(&self, token: String) -> AppResult<()> {
        let found = self
            .uow
            .tokens()
            .find_verification(&token)
            .await?
            .ok_or_else(|| AppError::validation("Invalid verification token"))?;

        if found.is_expired(Utc::now()) {
            self.uow.tokens().delete_verification(&token).await?;
            return Err(AppError::validation("Verification token expired"));
        }

        self.uow.users().set_email_verified(found.user_id).await?;
        self.uow.tokens().delete_verification(&token).await?;

        tracing::info!(user_id = %found.user_id, "Email verified");
        Ok(())
    }

    async fn resend_verification(&self, email: String) -> AppResult<()> {
        let user = self
            .uow
            .users()
            .find_by_email(&email)
            .await?
            .ok_or(AppError::NotFound)?;

        if user.email_verified {
            return Err(AppError::validation("Email already verified"));
        }

        // issue_verification drops any previous token for this user
        let token = generate_account_token();
        let expires_at = Utc::now() + Duration::hours(VERIFICATION_TOKEN_TTL_HOURS);
        self.uow
            .tokens()
            .issue_verification(user.id, token.clone(), expires_at)
            .await?;

        self.mailer
            .send_verification_email(&user.email, &token)
            .await
    }

    async fn request_password_reset(&self, email: String) -> AppResult<()> {
        // Unknown addresses fall through silently; the response is the
        // same in both cases
        if let Some(user) = self.uow.users().find_by_email(&email).await? {
            let token = generate_account_token();
            let expires_at = Utc::now() + Duration::hours(RESET_TOKEN_TTL_HOURS);
            self.uow
                .tokens()
                .issue_reset(user.id, token.clone(), expires_at)
                .await?;

            self.mailer
                .send_password_reset_email(&user.email, &token)
                .await?;
        }

        Ok(())
    }

    async fn reset_password(&self, token: String, new_password: String) -> AppResult<()> {
        let found = self
            .uow
            .tokens()
            .find_reset(&token)
            .await?
            .ok_or_else(|| AppError::validation("Invalid reset token"))?;

        if found.is_expired(Utc::now()) {
            self.uow.tokens().delete_reset(&token).await?;
            return Err(AppError::validation("Reset token expired"));
        }

        let password_hash = Password::new(&new_password)?.into_string();
        self.uow
            .users()
            .update_password(found.user_id, password_hash)
            .await?;
        self.uow.tokens().delete_reset(&token).await?;

        tracing::info!(user_id = %found.user_id, "Password reset");
        Ok(())
    }

    async fn ensure_verified(&self, user_id: Uuid) -> AppResult<()> {
        let user = self
            .uow
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !user.email_verified {
            return Err(AppError::EmailNotVerified);
        }
        Ok(())
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        verify_token_internal(token, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_tokens_are_hex_and_unique() {
        let a = generate_account_token();
        let b = generate_account_token();

        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
