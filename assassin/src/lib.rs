//! # Assassin
//!
//! Secret target chains for assassin-style group games.
//!
//! Every player is assigned one other player as their target so that the
//! targets form a single cycle through the whole group. Players learn only
//! their own target, by mail.
//!
//! ## Core Modules
//!
//! - [`chain`]: Random single-cycle generation and chain validation
//! - [`roster`]: CSV roster parsing into participants
//! - [`mail`]: Per-player target delivery over SMTP
//! - [`checkin`]: Timestamped selfie check-ins
//! - [`db`]: PostgreSQL pool for check-in persistence
//!
//! ## Example
//!
//! ```
//! use assassin::{chain::ChainGenerator, roster::parse_roster};
//!
//! let csv = "name,email\nAna,ana@example.com\nBen,ben@example.com\nCy,cy@example.com\n";
//! let players = parse_roster(csv.as_bytes()).unwrap();
//!
//! let chain = ChainGenerator::from_os_rng().generate(&players).unwrap().to_chain();
//! assert_eq!(chain.len(), 3);
//! assert!(chain.validate().is_ok());
//! ```

pub mod chain;
pub mod checkin;
pub mod db;
pub mod mail;
pub mod roster;

pub use chain::{Assignment, Chain, ChainError, ChainGenerator, Participant, TargetInfo, generate};
