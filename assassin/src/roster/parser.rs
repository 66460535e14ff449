//! CSV roster parsing.

use super::errors::{RosterError, RosterResult};
use crate::chain::Participant;
use crate::mail::is_valid_address;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashSet;

/// Columns every roster must provide
pub const REQUIRED_COLUMNS: [&str; 2] = ["name", "email"];

/// Parse an uploaded CSV roster into participants, in file order.
///
/// The header row must contain `name` and `email` (any case, any position);
/// other columns are ignored. Blank lines are skipped and cells are trimmed.
///
/// # Errors
///
/// * `RosterError::NotUtf8` - Upload is not text
/// * `RosterError::MissingColumns` - Header lacks a required column
/// * `RosterError::EmptyName` / `RosterError::InvalidEmail` - Bad record
/// * `RosterError::DuplicateName` - Same name twice
/// * `RosterError::TooFewParticipants` - Fewer than 2 records
/// * `RosterError::Csv` - Malformed CSV
pub fn parse_roster(bytes: &[u8]) -> RosterResult<Vec<Participant>> {
    let text = std::str::from_utf8(bytes).map_err(|_| RosterError::NotUtf8)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let (name_idx, email_idx) = match (column(&headers, "name"), column(&headers, "email")) {
        (Some(name), Some(email)) => (name, email),
        (name, email) => {
            let missing = [name, email]
                .iter()
                .zip(REQUIRED_COLUMNS)
                .filter(|(idx, _)| idx.is_none())
                .map(|(_, col)| col.to_string())
                .collect();
            return Err(RosterError::MissingColumns(missing));
        }
    };

    let mut participants = Vec::new();
    let mut names = HashSet::new();

    for (i, record) in reader.records().enumerate() {
        let record = record?;
        // Line in the file, header included; empty lines yield no record
        let row = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(i + 2);

        if record.iter().all(str::is_empty) {
            continue;
        }

        let name = record.get(name_idx).unwrap_or_default();
        let email = record.get(email_idx).unwrap_or_default();

        if name.is_empty() {
            return Err(RosterError::EmptyName { row });
        }
        if !is_valid_address(email) {
            return Err(RosterError::InvalidEmail {
                row,
                email: email.to_string(),
            });
        }
        if !names.insert(name.to_string()) {
            return Err(RosterError::DuplicateName(name.to_string()));
        }

        participants.push(Participant::new(name, email));
    }

    if participants.len() < 2 {
        return Err(RosterError::TooFewParticipants(participants.len()));
    }

    log::debug!("Parsed roster with {} participants", participants.len());
    Ok(participants)
}

fn column(headers: &StringRecord, wanted: &str) -> Option<usize> {
    headers.iter().position(|h| h.eq_ignore_ascii_case(wanted))
}
