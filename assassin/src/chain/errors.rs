//! Chain error types.

use thiserror::Error;

/// Chain generation and validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    /// Fewer than two participants, so no cycle exists
    #[error("Invalid input: need at least 2 participants, got {0}")]
    InvalidInput(usize),

    /// A player is assigned to themselves
    #[error("Player {0} targets themselves")]
    SelfTarget(String),

    /// A target is not a player of the chain
    #[error("Target {target} of {player} is not in the chain")]
    UnknownTarget { player: String, target: String },

    /// Two players share the same target
    #[error("Target {0} is assigned more than once")]
    DuplicateTarget(String),

    /// The chain splits into several shorter cycles
    #[error("Chain is not a single cycle: found a cycle of {cycle_len}, expected {expected}")]
    BrokenCycle { cycle_len: usize, expected: usize },
}

/// Result type for chain operations
pub type ChainResult<T> = Result<T, ChainError>;
