//! Check-in error types.

use thiserror::Error;

/// Check-in errors
#[derive(Debug, Error)]
pub enum CheckInError {
    /// Name is blank
    #[error("Name is required")]
    EmptyName,

    /// Upload is not an image
    #[error("Please select an image file (got {0})")]
    NotAnImage(String),

    /// Upload has no content
    #[error("Image is empty")]
    EmptyImage,

    /// Image storage failure
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl CheckInError {
    /// Whether the caller sent something we refuse, as opposed to a server fault
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CheckInError::EmptyName | CheckInError::NotAnImage(_) | CheckInError::EmptyImage
        )
    }

    /// Get a client-safe error message
    ///
    /// Storage and database errors are sanitized so paths and SQL details
    /// stay on the server.
    pub fn client_message(&self) -> String {
        match self {
            CheckInError::Storage(_) => "Failed to store image".to_string(),
            CheckInError::Database(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for check-in operations
pub type CheckInResult<T> = Result<T, CheckInError>;
