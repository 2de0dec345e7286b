//! Repository layer: storage contracts and their SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented access to the entries ledger and settings documents.
//! - Keep SQL details out of service orchestration.
//!
//! # Invariants
//! - Repositories never open their own transactions; callers pass a
//!   connection (or transaction) that already bounds the unit of work.
//! - Read paths reject invalid persisted rows instead of masking them.

pub mod entry_repo;
pub mod settings_repo;
