//! API error type and its mapping to HTTP responses.
//!
//! Client mistakes become `400`, mail transport trouble `502` and storage
//! faults `500`. Bodies always have the shape `{"error": "..."}`.

use assassin::{
    chain::ChainError, checkin::CheckInError, mail::MailError, roster::RosterError,
};
use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Errors surfaced by handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed request field
    #[error("{0}")]
    BadRequest(String),

    /// Unreadable multipart body
    #[error("Invalid form data: {0}")]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Mail(#[from] MailError),

    #[error(transparent)]
    CheckIn(#[from] CheckInError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Roster(_) | ApiError::Chain(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Multipart(e) => e.status(),
            ApiError::Mail(MailError::Address(_)) => StatusCode::BAD_REQUEST,
            ApiError::Mail(_) => StatusCode::BAD_GATEWAY,
            ApiError::CheckIn(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::CheckIn(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand to the caller
    pub fn client_message(&self) -> String {
        match self {
            ApiError::Mail(e) => e.client_message(),
            ApiError::CheckIn(e) => e.client_message(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, "Request failed: {}", self);
        } else {
            tracing::warn!(status = %status, "Request rejected: {}", self);
        }

        (
            status,
            Json(ErrorResponse {
                error: self.client_message(),
            }),
        )
            .into_response()
    }
}
