use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

/// Outcomes a handler can get back from the auth services. Validation and
/// lookup misses are normal negative results; the handlers translate them
/// into a flash message and a redirect. The fault variants carry the
/// underlying cause for logging.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("email already registered")]
    EmailTaken,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("no account found for this email")]
    UnknownEmail,

    #[error("reset token expired")]
    TokenExpired,

    #[error("reset token invalid")]
    TokenInvalid,

    #[error("token signing failed: {0}")]
    TokenSign(#[from] jsonwebtoken::errors::Error),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("database error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("mail transport error: {0}")]
    Mail(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::PasswordMismatch
            | AuthError::EmailTaken
            | AuthError::TokenExpired
            | AuthError::TokenInvalid => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials | AuthError::UnknownEmail => StatusCode::UNAUTHORIZED,
            AuthError::TokenSign(_)
            | AuthError::Hash(_)
            | AuthError::Storage(_)
            | AuthError::Session(_)
            | AuthError::Mail(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, self.to_string()).into_response()
    }
}
