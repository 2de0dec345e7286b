//! Ordered entry ledger with oldest-first eviction.
//!
//! # Invariants
//! - After `append`, the ledger holds at most `cap` entries.
//! - Kept entries are exactly the most recently appended ones.
//! - Eviction never reassigns the evicted entry's position itself.

use crate::model::entry::Entry;
use crate::repo::entry_repo::{EntryRepository, RepoResult};
use log::info;
use std::collections::HashSet;

pub struct EntryLedger<R: EntryRepository> {
    repo: R,
}

impl<R: EntryRepository> EntryLedger<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Appends `entry`, then evicts from the front until `cap` is satisfied.
    ///
    /// Returns the number of evicted entries.
    pub fn append(&self, entry: &Entry, cap: u32) -> RepoResult<usize> {
        self.repo.insert_entry(entry)?;
        let evicted = self.repo.evict_oldest(cap)?;
        if evicted > 0 {
            info!("event=ledger_evict module=ledger status=ok evicted={evicted} cap={cap}");
        }
        Ok(evicted)
    }

    pub fn all(&self) -> RepoResult<Vec<Entry>> {
        self.repo.list_entries()
    }

    /// Last `min(n, len)` entries in insertion order. Older entries are
    /// hidden, not deleted.
    pub fn recent(&self, n: u32) -> RepoResult<Vec<Entry>> {
        self.repo.list_recent_entries(n)
    }

    pub fn len(&self) -> RepoResult<u64> {
        self.repo.count_entries()
    }

    pub fn is_empty(&self) -> RepoResult<bool> {
        Ok(self.len()? == 0)
    }

    pub fn occupied_positions(&self) -> RepoResult<HashSet<u32>> {
        self.repo.occupied_positions()
    }

    pub fn latest_timestamp(&self) -> RepoResult<Option<i64>> {
        self.repo.latest_timestamp()
    }

    pub fn clear(&self) -> RepoResult<usize> {
        let cleared = self.repo.clear_entries()?;
        info!("event=ledger_clear module=ledger status=ok cleared={cleared}");
        Ok(cleared)
    }
}
