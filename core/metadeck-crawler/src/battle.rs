//! Battle record normalization.
//!
//! Turns one raw battle-log entry into a canonical deck observation, or a
//! skip when the entry carries no usable 8-card deck. Skips are expected
//! data-quality noise, not errors.

use metadeck_types::{CardId, DECK_SIZE, DeckKey};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One historical match from a player's battle log.
///
/// Only the fields needed for deck extraction are decoded; everything else
/// the provider sends is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleRecord {
    #[serde(default)]
    pub team: Option<Vec<BattleSide>>,
    #[serde(default)]
    pub opponent: Option<Vec<BattleSide>>,
}

/// One side of a battle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleSide {
    #[serde(default)]
    pub cards: Option<Vec<BattleCard>>,
    #[serde(default)]
    pub crowns: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleCard {
    pub id: CardId,
    #[serde(default)]
    pub level: Option<u32>,
}

/// A valid deck sighting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckObservation {
    pub deck_key: DeckKey,
    /// Card ids sorted ascending.
    pub cards: Vec<CardId>,
    /// Player's crowns strictly exceeded the first opponent's. Draws are not wins.
    pub is_win: bool,
}

/// Why a battle was not counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The player's side has no card list.
    NoCards,
    /// The card list does not hold exactly 8 cards.
    WrongCardCount(usize),
    /// The entry could not be decoded at all.
    Unreadable,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoCards => f.write_str("no cards in team"),
            SkipReason::WrongCardCount(n) => write!(f, "{n} cards instead of {DECK_SIZE}"),
            SkipReason::Unreadable => f.write_str("unreadable battle entry"),
        }
    }
}

/// Result of normalizing one battle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    Deck(DeckObservation),
    Skip(SkipReason),
}

/// Normalizes a decoded battle record.
pub fn normalize_battle(battle: &BattleRecord) -> Normalized {
    let me = battle.team.as_deref().and_then(<[BattleSide]>::first);
    let Some(cards) = me.and_then(|side| side.cards.as_deref()) else {
        return Normalized::Skip(SkipReason::NoCards);
    };
    if cards.len() != DECK_SIZE {
        return Normalized::Skip(SkipReason::WrongCardCount(cards.len()));
    }

    let ids: Vec<CardId> = cards.iter().map(|c| c.id).collect();
    let (deck_key, cards) = DeckKey::from_cards(&ids);

    let my_crowns = me.and_then(|side| side.crowns).unwrap_or(0);
    let their_crowns = battle
        .opponent
        .as_deref()
        .and_then(<[BattleSide]>::first)
        .and_then(|side| side.crowns)
        .unwrap_or(0);

    Normalized::Deck(DeckObservation {
        deck_key,
        cards,
        is_win: my_crowns > their_crowns,
    })
}

/// Decodes and normalizes a raw battle-log entry.
pub fn normalize_value(raw: &Value) -> Normalized {
    match BattleRecord::deserialize(raw) {
        Ok(battle) => normalize_battle(&battle),
        Err(_) => Normalized::Skip(SkipReason::Unreadable),
    }
}
