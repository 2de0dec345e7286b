//! Submission use case: validate, allocate a tile, append, evict.
//!
//! # Invariants
//! - One settings snapshot and one occupancy snapshot serve the whole call.
//! - Callers run `submit` inside a single write transaction so that
//!   allocation and append cannot interleave with another submission.

use crate::model::entry::{Entry, EntryValidationError, SubmissionInput};
use crate::repo::entry_repo::EntryRepository;
use crate::repo::settings_repo::SettingsRepository;
use crate::service::allocator::PositionAllocator;
use crate::service::error::MosaicResult;
use crate::service::ledger::EntryLedger;
use crate::service::settings_store::SettingsStore;
use log::info;
use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

pub struct SubmissionWorkflow<S: SettingsRepository, E: EntryRepository> {
    settings: SettingsStore<S>,
    ledger: EntryLedger<E>,
}

impl<S: SettingsRepository, E: EntryRepository> SubmissionWorkflow<S, E> {
    pub fn new(settings: SettingsStore<S>, ledger: EntryLedger<E>) -> Self {
        Self { settings, ledger }
    }

    /// Accepts one submission and returns the stored entry.
    ///
    /// # Errors
    /// - `MosaicError::Entry` for missing/oversized fields or an unknown symbol.
    /// - `MosaicError::CapacityExhausted` when the grid has no free tile.
    /// - `MosaicError::Storage` when the ledger cannot be read or written.
    pub fn submit<G: Rng + ?Sized>(
        &self,
        raw_name: &str,
        raw_message: &str,
        raw_symbol: &str,
        rng: &mut G,
    ) -> MosaicResult<Entry> {
        let input = SubmissionInput::parse(raw_name, raw_message, raw_symbol)?;

        let settings = self.settings.load();
        if !settings.has_symbol(&input.symbol) {
            return Err(EntryValidationError::UnknownSymbol(input.symbol).into());
        }

        let position = if settings.is_positional() {
            let allocator = PositionAllocator::for_settings(&settings);
            let occupied = self.ledger.occupied_positions()?;
            let available = allocator.available_positions(&occupied);
            Some(allocator.allocate(&available, rng)?)
        } else {
            None
        };

        let timestamp = match self.ledger.latest_timestamp()? {
            Some(latest) => now_epoch_ms().max(latest),
            None => now_epoch_ms(),
        };

        let entry = Entry::from_submission(input, timestamp, position);
        let evicted = self.ledger.append(&entry, settings.effective_cap())?;
        info!(
            "event=entry_submit module=submission status=ok id={} position={} evicted={}",
            entry.id,
            entry
                .position
                .map_or_else(|| "none".to_string(), |position| position.to_string()),
            evicted
        );
        Ok(entry)
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
