//! Mail error types.

use thiserror::Error;

/// Mail composition and delivery errors
#[derive(Debug, Error)]
pub enum MailError {
    /// Sender or recipient is not a valid mailbox
    #[error("Invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// Message could not be built
    #[error("Failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    /// SMTP transport failure
    #[error("SMTP error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// A message of a batch could not be delivered; the batch is aborted
    #[error("Error sending email to {recipient}: {source}")]
    Delivery {
        recipient: String,
        /// Messages of the batch that went out before the failure
        sent: usize,
        #[source]
        source: Box<MailError>,
    },
}

impl MailError {
    /// Get a client-safe error message
    ///
    /// SMTP server responses can echo credentials or internal hostnames, so
    /// only the failing recipient is reported.
    pub fn client_message(&self) -> String {
        match self {
            MailError::Delivery { recipient, .. } => {
                format!("Error sending email to {recipient}")
            }
            MailError::Transport(_) => "Mail server unavailable".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for mail operations
pub type MailResult<T> = Result<T, MailError>;
