//! Participant rosters uploaded by the host.
//!
//! A roster is a CSV file with a header row containing at least `name` and
//! `email`. Every problem is reported before a chain is generated.

pub mod errors;
pub mod parser;

pub use errors::{RosterError, RosterResult};
pub use parser::{REQUIRED_COLUMNS, parse_roster};
