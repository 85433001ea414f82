// Authentication and authorization error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, error, warn};

use crate::auth::models::Role;
use crate::invites::service::InviteError;
use crate::store::StoreError;

/// Authentication, registration and authorization failures
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    // Form input errors
    #[error("Missing required fields")]
    MissingFields,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Invalid email format")]
    InvalidEmail,
    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Email does not match the invite")]
    EmailMismatch,
    #[error("Email already exists")]
    EmailAlreadyExists,

    // Invite errors
    #[error("Invalid invite")]
    InvalidInvite,
    /// Invite expired or was already redeemed
    #[error("Invite expired or already used")]
    InviteUnavailable,

    // Session token errors
    #[error("Missing authentication token")]
    MissingToken,
    #[error("Token signature is invalid")]
    InvalidSignature,
    #[error("Token has expired")]
    ExpiredToken,
    #[error("Token is malformed")]
    MalformedToken,

    // Authorization errors
    /// User lacks the role required for the operation
    #[error("Insufficient permissions: required role '{required}', but user has role '{actual}'")]
    InsufficientPermissions { required: Role, actual: Role },

    // Internal errors
    #[error("Password hashing error: {0}")]
    PasswordHashError(String),
    #[error("Token generation error: {0}")]
    TokenGenerationError(String),
    #[error("Storage error: {0}")]
    StorageError(#[from] StoreError),
}

impl AuthError {
    /// True for the three ways a presented session token can be rejected
    pub fn is_token_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidSignature | AuthError::ExpiredToken | AuthError::MalformedToken
        )
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingFields
            | AuthError::InvalidEmail
            | AuthError::PasswordTooShort(_)
            | AuthError::PasswordMismatch
            | AuthError::EmailMismatch
            | AuthError::EmailAlreadyExists
            | AuthError::InvalidInvite
            | AuthError::InviteUnavailable => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::InvalidSignature
            | AuthError::ExpiredToken
            | AuthError::MalformedToken => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientPermissions { .. } => StatusCode::FORBIDDEN,
            AuthError::PasswordHashError(_)
            | AuthError::TokenGenerationError(_)
            | AuthError::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code used in `?error=` redirects of the page flows
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingFields => "missing_fields",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::InvalidEmail => "invalid_email",
            AuthError::PasswordTooShort(_) => "password_too_short",
            AuthError::PasswordMismatch => "password_mismatch",
            AuthError::EmailMismatch => "email_mismatch",
            AuthError::EmailAlreadyExists => "email_exists",
            AuthError::InvalidInvite => "invalid_invite",
            AuthError::InviteUnavailable => "invite_expired",
            AuthError::MissingToken => "missing_token",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::ExpiredToken => "expired_token",
            AuthError::MalformedToken => "malformed_token",
            AuthError::InsufficientPermissions { .. } => "forbidden",
            AuthError::PasswordHashError(_)
            | AuthError::TokenGenerationError(_)
            | AuthError::StorageError(_) => "internal_error",
        }
    }

    /// Message that is safe to send to clients (no internal details)
    pub fn error_message(&self) -> String {
        match self {
            AuthError::InsufficientPermissions { required, .. } => {
                format!("Insufficient permissions: required role '{}'", required)
            }
            AuthError::PasswordHashError(_)
            | AuthError::TokenGenerationError(_)
            | AuthError::StorageError(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    /// Emit a log line at the level matching the error's severity
    pub fn log(&self) {
        match self {
            AuthError::PasswordHashError(_)
            | AuthError::TokenGenerationError(_)
            | AuthError::StorageError(_) => error!("Internal auth error: {}", self),
            AuthError::InsufficientPermissions { required, actual } => {
                warn!("Authorization failed: required role '{}', user has role '{}'", required, actual)
            }
            AuthError::InvalidCredentials
            | AuthError::InvalidSignature
            | AuthError::ExpiredToken
            | AuthError::MalformedToken => warn!("Authentication rejected: {}", self),
            _ => debug!("Auth request rejected: {}", self),
        }
    }
}

impl From<InviteError> for AuthError {
    fn from(err: InviteError) -> Self {
        match err {
            InviteError::NotFound => AuthError::InvalidInvite,
            InviteError::Expired | InviteError::AlreadyUsed => AuthError::InviteUnavailable,
            InviteError::MissingEmail => AuthError::MissingFields,
            InviteError::InvalidEmail => AuthError::InvalidEmail,
            InviteError::Storage(err) => AuthError::StorageError(err),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();

        let body = Json(json!({
            "error": self.error_message(),
            "error_code": self.error_code(),
        }));

        (self.status_code(), body).into_response()
    }
}
