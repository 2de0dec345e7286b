//! Shared mosaic store: the single owner of the database connection.
//!
//! # Responsibility
//! - Expose the mosaic operations to the HTTP layer.
//! - Bound every operation by one lock acquisition plus one SQLite
//!   transaction.
//!
//! # Invariants
//! - "load settings -> compute occupancy -> allocate -> append -> evict"
//!   runs as one `BEGIN IMMEDIATE` transaction, serialized with every other
//!   write in this process and in any process sharing the database file.
//! - A failed operation rolls back; readers only see committed documents.

use crate::db::{open_db, open_db_in_memory};
use crate::model::entry::Entry;
use crate::model::settings::{AdminSettings, LogoSlot, SettingsUpdate};
use crate::repo::entry_repo::SqliteEntryRepository;
use crate::repo::settings_repo::SqliteSettingsRepository;
use crate::service::error::MosaicResult;
use crate::service::ledger::EntryLedger;
use crate::service::settings_store::SettingsStore;
use crate::service::submission::SubmissionWorkflow;
use log::{error, warn};
use rand::Rng;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde_json::Value;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Thread-safe handle over the mosaic database. Share it through `Arc`.
pub struct MosaicStore {
    conn: Mutex<Connection>,
}

impl MosaicStore {
    /// Opens (or creates) a file-backed store.
    pub fn open(path: impl AsRef<Path>) -> MosaicResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    pub fn open_in_memory() -> MosaicResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps a connection that already has migrations applied.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Accepts one submission using the thread-local RNG for tile selection.
    pub fn submit(&self, name: &str, message: &str, symbol: &str) -> MosaicResult<Entry> {
        self.submit_with_rng(name, message, symbol, &mut rand::thread_rng())
    }

    pub fn submit_with_rng<G: Rng + ?Sized>(
        &self,
        name: &str,
        message: &str,
        symbol: &str,
        rng: &mut G,
    ) -> MosaicResult<Entry> {
        self.write(|tx| {
            let workflow = SubmissionWorkflow::new(settings_store(tx), ledger(tx));
            workflow.submit(name, message, symbol, rng)
        })
    }

    /// Newest `limit` entries, oldest first. Empty on storage failure.
    pub fn recent_entries(&self, limit: u32) -> Vec<Entry> {
        self.read_entries("recent", |tx| ledger(tx).recent(limit).map_err(Into::into))
    }

    /// Every live entry, oldest first. Empty on storage failure.
    pub fn all_entries(&self) -> Vec<Entry> {
        self.read_entries("all", |tx| ledger(tx).all().map_err(Into::into))
    }

    /// Entries the mosaic page renders for the current grid.
    pub fn mosaic_entries(&self) -> Vec<Entry> {
        self.read_entries("mosaic", |tx| {
            let limit = settings_store(tx).load().display_limit();
            ledger(tx).recent(limit).map_err(Into::into)
        })
    }

    pub fn entry_count(&self) -> MosaicResult<u64> {
        self.read(|tx| Ok(ledger(tx).len()?))
    }

    /// Removes every entry. Returns how many were removed.
    pub fn clear_entries(&self) -> MosaicResult<usize> {
        self.write(|tx| Ok(ledger(tx).clear()?))
    }

    /// Current settings. Falls back to defaults if storage is unavailable.
    pub fn settings(&self) -> AdminSettings {
        match self.write(|tx| Ok(settings_store(tx).load())) {
            Ok(settings) => settings,
            Err(err) => {
                error!("event=settings_get module=store status=error fallback=defaults error={err}");
                AdminSettings::default()
            }
        }
    }

    pub fn update_settings(&self, update: &SettingsUpdate) -> MosaicResult<AdminSettings> {
        self.write(|tx| settings_store(tx).update(update))
    }

    pub fn replace_color_scheme(&self, document: &Value) -> MosaicResult<()> {
        self.write(|tx| settings_store(tx).replace_color_scheme(document))
    }

    pub fn add_symbol(&self, filename: &str, label: &str) -> MosaicResult<()> {
        self.write(|tx| settings_store(tx).add_symbol(filename, label))
    }

    pub fn remove_symbol(&self, filename: &str) -> MosaicResult<()> {
        self.write(|tx| settings_store(tx).remove_symbol(filename))
    }

    pub fn set_logo(&self, slot: LogoSlot, filename: &str) -> MosaicResult<()> {
        self.write(|tx| settings_store(tx).set_logo(slot, filename))
    }

    fn write<T>(&self, op: impl FnOnce(&Transaction<'_>) -> MosaicResult<T>) -> MosaicResult<T> {
        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = op(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    fn read<T>(&self, op: impl FnOnce(&Transaction<'_>) -> MosaicResult<T>) -> MosaicResult<T> {
        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;
        let value = op(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    fn read_entries(
        &self,
        view: &'static str,
        op: impl FnOnce(&Transaction<'_>) -> MosaicResult<Vec<Entry>>,
    ) -> Vec<Entry> {
        self.read(op).unwrap_or_else(|err| {
            error!("event=ledger_read module=store status=error view={view} fallback=empty error={err}");
            Vec::new()
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            // An interrupted transaction was rolled back when it dropped.
            warn!("event=store_lock module=store status=recovered reason=poisoned");
            poisoned.into_inner()
        })
    }
}

fn settings_store<'a>(tx: &'a Transaction<'_>) -> SettingsStore<SqliteSettingsRepository<'a>> {
    SettingsStore::new(SqliteSettingsRepository::new(tx))
}

fn ledger<'a>(tx: &'a Transaction<'_>) -> EntryLedger<SqliteEntryRepository<'a>> {
    EntryLedger::new(SqliteEntryRepository::new(tx))
}
