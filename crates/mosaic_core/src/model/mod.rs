//! Domain model for the tribute mosaic.
//!
//! # Responsibility
//! - Define the canonical entry record and the admin settings document.
//! - Keep validation rules next to the types they protect.
//!
//! # Invariants
//! - Every live entry has a ledger-unique `id`.
//! - Two live entries never share a grid `position`.
//! - A settings document always carries at least one symbol.

pub mod asset;
pub mod color_scheme;
pub mod entry;
pub mod settings;
