//! Core engine of the tribute mosaic.
//!
//! Owns the invariants of the system: tile uniqueness, the live-entry cap
//! with oldest-first eviction, and forward-compatible settings loading.
//! HTTP routing, templates and file uploads live outside this crate.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::color_scheme::{is_hex_color, ColorScheme};
pub use model::entry::{
    Entry, EntryId, EntryValidationError, SubmissionInput, MAX_MESSAGE_CHARS, MAX_NAME_CHARS,
};
pub use model::settings::{
    default_document, merge_defaults, repair_mistyped_fields, AdminSettings, GridMode, LogoSlot,
    SettingsUpdate, NON_EMPTY_KEYS,
    SettingsValidationError, SymbolSpec,
};
pub use repo::entry_repo::{EntryRepository, RepoError, RepoResult, SqliteEntryRepository};
pub use repo::settings_repo::{SettingsRepository, SqliteSettingsRepository};
pub use service::allocator::PositionAllocator;
pub use service::error::{MosaicError, MosaicResult};
pub use service::ledger::EntryLedger;
pub use service::settings_store::SettingsStore;
pub use service::submission::SubmissionWorkflow;
pub use store::MosaicStore;

/// Minimal health-check API for wiring checks.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
