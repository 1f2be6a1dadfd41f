/// Error types for auth-service
///
/// HTTP responses carry a `{"detail": "<message>"}` body. Credential and
/// account-existence failures intentionally share generic messages so the
/// API does not disclose which emails are registered.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email or password is invalid")]
    RegistrationRejected,

    #[error("Password does not meet the strength requirements")]
    WeakPassword,

    #[error("Token invalid or expired.")]
    TokenInvalid,

    #[error("Invalid activation link or token expired.")]
    InvalidLink,

    #[error("Refresh token not found!")]
    RefreshTokenMissing,

    #[error("Refresh token invalid!")]
    RefreshTokenInvalid,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials | AuthError::RefreshTokenInvalid => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::RegistrationRejected
            | AuthError::WeakPassword
            | AuthError::TokenInvalid
            | AuthError::InvalidLink
            | AuthError::RefreshTokenMissing
            | AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::Database(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let detail = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "An error has occurred. Please try again.".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(status).json(ErrorBody { detail })
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        AuthError::Database(err.to_string())
    }
}

impl From<auth_token::TokenError> for AuthError {
    fn from(_: auth_token::TokenError) -> Self {
        AuthError::RefreshTokenInvalid
    }
}
