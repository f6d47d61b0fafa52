//! The persisted leaderboard record.

use crate::deck::{CardId, DeckKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the meta-deck leaderboard, keyed by [`DeckKey`].
///
/// Rates are percentages in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaDeckSummary {
    pub deck_key: DeckKey,
    pub cards: Vec<CardId>,
    pub usage_count: u64,
    pub win_count: u64,
    pub win_rate: f64,
    pub use_rate: f64,
    /// Provenance tag, e.g. `topladder-sampled`.
    pub source: String,
    pub last_seen_at: DateTime<Utc>,
}

/// `100 * wins / usage`, or 0 when the deck was never used.
#[must_use]
pub fn win_rate(win_count: u64, usage_count: u64) -> f64 {
    if usage_count == 0 {
        return 0.0;
    }
    win_count as f64 / usage_count as f64 * 100.0
}

/// `100 * usage / total`, or 0 when no valid battle was seen.
#[must_use]
pub fn use_rate(usage_count: u64, total_valid_battles: u64) -> f64 {
    if total_valid_battles == 0 {
        return 0.0;
    }
    usage_count as f64 / total_valid_battles as f64 * 100.0
}
