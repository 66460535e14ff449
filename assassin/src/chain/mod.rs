//! Secret target chains.
//!
//! A chain assigns every participant exactly one target among the others so
//! that following targets visits everybody once and comes back to the start:
//!
//! - **Generator**: uniform shuffle, then link each participant to the next
//! - **Assignment**: the resulting cycle in shuffled order
//! - **Chain**: the name-keyed view handed to hosts and mail delivery
//!
//! ## Example
//!
//! ```
//! use assassin::chain::{ChainGenerator, Participant};
//!
//! let players = vec![
//!     Participant::new("Ana", "ana@example.com"),
//!     Participant::new("Ben", "ben@example.com"),
//!     Participant::new("Cy", "cy@example.com"),
//! ];
//!
//! let assignment = ChainGenerator::seeded(42).generate(&players).unwrap();
//! let chain = assignment.to_chain();
//! assert!(chain.validate().is_ok());
//! ```

pub mod errors;
pub mod generator;
pub mod models;

pub use errors::{ChainError, ChainResult};
pub use generator::{ChainGenerator, generate};
pub use models::{Assignment, Chain, Link, Participant, TargetInfo};
