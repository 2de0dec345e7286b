//! Entry ledger repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Ledger order is the `seq` insertion order.
//! - `position` uniqueness is also enforced by a partial unique index.

use crate::db::DbError;
use crate::model::entry::Entry;
use rusqlite::{params, Connection, Row};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const ENTRY_SELECT_SQL: &str = "SELECT
    id,
    name,
    message,
    symbol,
    created_at,
    position
FROM entries";

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error shared by the mosaic repositories.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Stored row or document cannot be mapped to the model.
    InvalidData(String),
    Serialization(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted mosaic data: {message}"),
            Self::Serialization(err) => write!(f, "settings serialization failed: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
            Self::Serialization(err) => Some(err),
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Storage primitives for the ordered entry ledger.
pub trait EntryRepository {
    /// Appends one entry at the end of the ledger.
    fn insert_entry(&self, entry: &Entry) -> RepoResult<()>;
    /// Deletes the oldest entries until at most `keep` remain.
    ///
    /// Returns the number of deleted entries.
    fn evict_oldest(&self, keep: u32) -> RepoResult<usize>;
    /// All entries, oldest first.
    fn list_entries(&self) -> RepoResult<Vec<Entry>>;
    /// The newest `limit` entries, oldest first.
    fn list_recent_entries(&self, limit: u32) -> RepoResult<Vec<Entry>>;
    fn count_entries(&self) -> RepoResult<u64>;
    /// Grid positions held by live entries.
    fn occupied_positions(&self) -> RepoResult<HashSet<u32>>;
    fn latest_timestamp(&self) -> RepoResult<Option<i64>>;
    /// Removes every entry. Returns the number of deleted entries.
    fn clear_entries(&self) -> RepoResult<usize>;
}

/// SQLite-backed entry ledger.
pub struct SqliteEntryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntryRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EntryRepository for SqliteEntryRepository<'_> {
    fn insert_entry(&self, entry: &Entry) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO entries (
                id,
                name,
                message,
                symbol,
                created_at,
                position
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                entry.id.as_str(),
                entry.name.as_str(),
                entry.message.as_str(),
                entry.symbol.as_str(),
                entry.timestamp,
                entry.position,
            ],
        )?;
        Ok(())
    }

    fn evict_oldest(&self, keep: u32) -> RepoResult<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM entries
             WHERE seq NOT IN (
                SELECT seq FROM entries ORDER BY seq DESC LIMIT ?1
             );",
            [i64::from(keep)],
        )?;
        Ok(deleted)
    }

    fn list_entries(&self) -> RepoResult<Vec<Entry>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ENTRY_SELECT_SQL} ORDER BY seq ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }
        Ok(entries)
    }

    fn list_recent_entries(&self, limit: u32) -> RepoResult<Vec<Entry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, message, symbol, created_at, position
             FROM (
                SELECT seq, id, name, message, symbol, created_at, position
                FROM entries
                ORDER BY seq DESC
                LIMIT ?1
             )
             ORDER BY seq ASC;",
        )?;
        let mut rows = stmt.query([i64::from(limit)])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }
        Ok(entries)
    }

    fn count_entries(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entries;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative entry count `{count}`")))
    }

    fn occupied_positions(&self) -> RepoResult<HashSet<u32>> {
        let mut stmt = self
            .conn
            .prepare("SELECT position FROM entries WHERE position IS NOT NULL;")?;
        let mut rows = stmt.query([])?;
        let mut occupied = HashSet::new();
        while let Some(row) = rows.next()? {
            occupied.insert(parse_position(row.get(0)?)?);
        }
        Ok(occupied)
    }

    fn latest_timestamp(&self) -> RepoResult<Option<i64>> {
        let latest = self
            .conn
            .query_row("SELECT MAX(created_at) FROM entries;", [], |row| row.get(0))?;
        Ok(latest)
    }

    fn clear_entries(&self) -> RepoResult<usize> {
        let deleted = self.conn.execute("DELETE FROM entries;", [])?;
        Ok(deleted)
    }
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<Entry> {
    let position = match row.get::<_, Option<i64>>("position")? {
        Some(value) => Some(parse_position(value)?),
        None => None,
    };

    Ok(Entry {
        id: row.get("id")?,
        name: row.get("name")?,
        message: row.get("message")?,
        symbol: row.get("symbol")?,
        timestamp: row.get("created_at")?,
        position,
    })
}

fn parse_position(value: i64) -> RepoResult<u32> {
    u32::try_from(value).map_err(|_| {
        RepoError::InvalidData(format!("invalid position `{value}` in entries.position"))
    })
}
