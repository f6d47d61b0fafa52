//! Canonical deck identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Upstream card identifier (e.g. `26000000`).
pub type CardId = u64;

/// Number of cards in a legal deck.
pub const DECK_SIZE: usize = 8;

/// Order-independent identity of a deck: the card ids sorted ascending and
/// joined with `-`.
///
/// Repeated ids are kept as reported; the key encodes the multiset, not a set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeckKey(String);

impl DeckKey {
    /// Builds the key for a card list in any order.
    ///
    /// Returns the key together with the sorted card list it was built from.
    #[must_use]
    pub fn from_cards(cards: &[CardId]) -> (Self, Vec<CardId>) {
        let mut sorted = cards.to_vec();
        sorted.sort_unstable();
        (Self::from_sorted(&sorted), sorted)
    }

    /// Builds the key for a card list that is already sorted ascending.
    #[must_use]
    pub fn from_sorted(sorted: &[CardId]) -> Self {
        let joined = sorted
            .iter()
            .map(CardId::to_string)
            .collect::<Vec<_>>()
            .join("-");
        Self(joined)
    }

    /// Wraps a key loaded back from storage.
    #[must_use]
    pub fn from_stored(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeckKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
