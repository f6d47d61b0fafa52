//! Core type definitions for the meta-deck crawler.
//!
//! This crate defines the plain data types shared by the crawler, the store
//! and the HTTP service:
//! - Player tags and ranked players as reported by the upstream ladder
//! - Canonical deck identity (`DeckKey`)
//! - The persisted `MetaDeckSummary` and the per-run `RunDiagnostics`
//! - Player card snapshots
//!
//! Nothing in here performs I/O.

mod deck;
mod diagnostics;
mod snapshot;
mod summary;
mod tag;

pub use deck::{CardId, DECK_SIZE, DeckKey};
pub use diagnostics::RunDiagnostics;
pub use snapshot::PlayerSnapshot;
pub use summary::{MetaDeckSummary, use_rate, win_rate};
pub use tag::{PlayerTag, RankedPlayer};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid player tag: {0}")]
    InvalidTag(String),
}
