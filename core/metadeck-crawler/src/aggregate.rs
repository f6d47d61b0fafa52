//! Run-scoped deck aggregation.

use crate::battle::DeckObservation;
use chrono::{DateTime, Utc};
use metadeck_types::{CardId, DeckKey, MetaDeckSummary, use_rate, win_rate};
use std::collections::HashMap;

/// Running counters for one deck.
#[derive(Debug, Clone)]
struct DeckStats {
    key: DeckKey,
    cards: Vec<CardId>,
    usage: u64,
    wins: u64,
}

/// Provenance stamped onto every summary of a run.
#[derive(Debug, Clone)]
pub struct Provenance {
    pub source: String,
    pub produced_at: DateTime<Utc>,
}

impl Provenance {
    pub fn now(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            produced_at: Utc::now(),
        }
    }
}

/// Accumulates deck observations for a single run.
///
/// Entries keep first-sighting order so ties in the final ranking resolve
/// the same way on every run over the same input.
#[derive(Debug, Default)]
pub struct DeckAggregator {
    index: HashMap<DeckKey, usize>,
    stats: Vec<DeckStats>,
    observed: u64,
}

impl DeckAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one valid battle.
    pub fn observe(&mut self, deck: DeckObservation) {
        let slot = match self.index.get(&deck.deck_key) {
            Some(&slot) => slot,
            None => {
                self.stats.push(DeckStats {
                    key: deck.deck_key.clone(),
                    cards: deck.cards,
                    usage: 0,
                    wins: 0,
                });
                self.index.insert(deck.deck_key, self.stats.len() - 1);
                self.stats.len() - 1
            }
        };

        let entry = &mut self.stats[slot];
        entry.usage += 1;
        if deck.is_win {
            entry.wins += 1;
        }
        self.observed += 1;
    }

    /// Number of valid battles observed so far.
    pub fn observed(&self) -> u64 {
        self.observed
    }

    /// Number of distinct decks observed so far.
    pub fn unique_decks(&self) -> usize {
        self.stats.len()
    }

    /// Projects the counters into summaries, most used first, keeping at most
    /// `cap` entries.
    pub fn finalize(
        self,
        total_valid_battles: u64,
        cap: usize,
        provenance: &Provenance,
    ) -> Vec<MetaDeckSummary> {
        let mut summaries: Vec<MetaDeckSummary> = self
            .stats
            .into_iter()
            .map(|s| MetaDeckSummary {
                deck_key: s.key,
                cards: s.cards,
                usage_count: s.usage,
                win_count: s.wins,
                win_rate: win_rate(s.wins, s.usage),
                use_rate: use_rate(s.usage, total_valid_battles),
                source: provenance.source.clone(),
                last_seen_at: provenance.produced_at,
            })
            .collect();

        // sort_by is stable: equal usage keeps first-sighting order
        summaries.sort_by(|a, b| b.usage_count.cmp(&a.usage_count));
        summaries.truncate(cap);
        summaries
    }
}
