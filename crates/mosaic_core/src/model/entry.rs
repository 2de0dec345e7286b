//! Mosaic entry model and submission input validation.
//!
//! # Invariants
//! - `name` is 1..=50 characters after trimming.
//! - `message` is 1..=200 characters after trimming.
//! - `position`, when set, lies in `[0, rows * cols)` of the grid that was
//!   active when the entry was accepted.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Maximum accepted name length, counted in characters.
pub const MAX_NAME_CHARS: usize = 50;
/// Maximum accepted message length, counted in characters.
pub const MAX_MESSAGE_CHARS: usize = 200;

/// Ledger-unique entry identifier.
pub type EntryId = String;

/// One accepted submission placed on the mosaic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub name: String,
    pub message: String,
    /// Filename of a symbol from the catalog at submission time.
    pub symbol: String,
    /// Unix epoch milliseconds. Non-decreasing in ledger order.
    pub timestamp: i64,
    /// Grid tile index. Absent when the grid is in `auto` mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

impl Entry {
    /// Builds an entry from validated input.
    ///
    /// Positioned entries get a tile-derived id (`tile-1` for position 0),
    /// unpositioned ones a random UUID token.
    pub fn from_submission(input: SubmissionInput, timestamp: i64, position: Option<u32>) -> Self {
        let id = match position {
            Some(position) => tile_id(position),
            None => Uuid::new_v4().to_string(),
        };
        Self {
            id,
            name: input.name,
            message: input.message,
            symbol: input.symbol,
            timestamp,
            position,
        }
    }
}

/// Returns the display id for a grid tile (1-based).
pub fn tile_id(position: u32) -> EntryId {
    format!("tile-{}", u64::from(position) + 1)
}

/// Trimmed and length-checked submission fields.
///
/// Symbol membership is checked later against the settings snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionInput {
    pub name: String,
    pub message: String,
    pub symbol: String,
}

impl SubmissionInput {
    /// Trims raw form fields and validates required-ness and lengths.
    pub fn parse(
        raw_name: &str,
        raw_message: &str,
        raw_symbol: &str,
    ) -> Result<Self, EntryValidationError> {
        let name = raw_name.trim();
        let message = raw_message.trim();
        let symbol = raw_symbol.trim();

        if name.is_empty() {
            return Err(EntryValidationError::MissingField("name"));
        }
        if message.is_empty() {
            return Err(EntryValidationError::MissingField("message"));
        }
        if symbol.is_empty() {
            return Err(EntryValidationError::MissingField("symbol"));
        }

        let name_chars = name.chars().count();
        if name_chars > MAX_NAME_CHARS {
            return Err(EntryValidationError::NameTooLong {
                chars: name_chars,
                max: MAX_NAME_CHARS,
            });
        }
        let message_chars = message.chars().count();
        if message_chars > MAX_MESSAGE_CHARS {
            return Err(EntryValidationError::MessageTooLong {
                chars: message_chars,
                max: MAX_MESSAGE_CHARS,
            });
        }

        Ok(Self {
            name: name.to_string(),
            message: message.to_string(),
            symbol: symbol.to_string(),
        })
    }
}

/// Rejection reasons for a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    /// Field was empty after trimming.
    MissingField(&'static str),
    NameTooLong { chars: usize, max: usize },
    MessageTooLong { chars: usize, max: usize },
    /// Symbol filename is not in the current catalog.
    UnknownSymbol(String),
}

impl Display for EntryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "{field} is required"),
            Self::NameTooLong { chars, max } => {
                write!(f, "name must be {max} characters or less (got {chars})")
            }
            Self::MessageTooLong { chars, max } => {
                write!(f, "message must be {max} characters or less (got {chars})")
            }
            Self::UnknownSymbol(symbol) => write!(f, "symbol `{symbol}` is not available"),
        }
    }
}

impl Error for EntryValidationError {}
