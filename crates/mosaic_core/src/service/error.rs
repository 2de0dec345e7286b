//! Error surface of the mosaic use cases.

use crate::db::DbError;
use crate::model::entry::EntryValidationError;
use crate::model::settings::SettingsValidationError;
use crate::repo::entry_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type MosaicResult<T> = Result<T, MosaicError>;

/// Failure of one mosaic operation. Never leaves persisted state half-written.
#[derive(Debug)]
pub enum MosaicError {
    /// Submission input was rejected.
    Entry(EntryValidationError),
    /// Admin edit was rejected.
    Settings(SettingsValidationError),
    /// Every grid tile is taken.
    CapacityExhausted { total_slots: u32 },
    /// Ledger or settings storage failed; the operation was rolled back.
    Storage(RepoError),
}

impl MosaicError {
    /// Whether the caller sent bad input (as opposed to a full mosaic or a
    /// storage failure).
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Entry(_) | Self::Settings(_))
    }

    pub fn is_capacity_exhausted(&self) -> bool {
        matches!(self, Self::CapacityExhausted { .. })
    }
}

impl Display for MosaicError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Entry(err) => write!(f, "{err}"),
            Self::Settings(err) => write!(f, "{err}"),
            Self::CapacityExhausted { total_slots } => {
                write!(f, "the mosaic is full ({total_slots} tiles taken)")
            }
            Self::Storage(err) => write!(f, "mosaic storage failure: {err}"),
        }
    }
}

impl Error for MosaicError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Entry(err) => Some(err),
            Self::Settings(err) => Some(err),
            Self::CapacityExhausted { .. } => None,
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<EntryValidationError> for MosaicError {
    fn from(value: EntryValidationError) -> Self {
        Self::Entry(value)
    }
}

impl From<SettingsValidationError> for MosaicError {
    fn from(value: SettingsValidationError) -> Self {
        Self::Settings(value)
    }
}

impl From<RepoError> for MosaicError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

impl From<DbError> for MosaicError {
    fn from(value: DbError) -> Self {
        Self::Storage(RepoError::Db(value))
    }
}

impl From<rusqlite::Error> for MosaicError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(RepoError::from(value))
    }
}
