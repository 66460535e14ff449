//! Roster error types.

use thiserror::Error;

/// Roster parsing and validation errors
#[derive(Debug, Error)]
pub enum RosterError {
    /// Upload is not UTF-8 text
    #[error("Roster must be UTF-8 encoded text")]
    NotUtf8,

    /// Required header columns are absent
    #[error("CSV must have \"name\" and \"email\" columns (missing: {})", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// A record has a blank name
    #[error("Row {row}: name is empty")]
    EmptyName { row: usize },

    /// A record has an unusable email address
    #[error("Row {row}: invalid email address {email:?}")]
    InvalidEmail { row: usize, email: String },

    /// Two records share a name, which would make targets ambiguous
    #[error("Duplicate player name: {0}")]
    DuplicateName(String),

    /// Not enough players to form a chain
    #[error("Need at least 2 players, got {0}")]
    TooFewParticipants(usize),

    /// Malformed CSV
    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for roster operations
pub type RosterResult<T> = Result<T, RosterError>;
