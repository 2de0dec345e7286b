//! Use-case services over the mosaic repositories.
//!
//! # Responsibility
//! - Orchestrate validation, allocation and persistence per request.
//! - Stay storage-agnostic: services only see repository traits.
//!
//! # Invariants
//! - Services never hold settings across calls; each call reads a fresh
//!   snapshot from its repository.

pub mod allocator;
pub mod error;
pub mod ledger;
pub mod settings_store;
pub mod submission;
