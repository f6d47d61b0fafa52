use crate::tag::PlayerTag;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A point-in-time copy of one player's card collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub user_id: String,
    pub player_tag: PlayerTag,
    pub player_name: String,
    /// Card id (as string, for JSON object keys) to card level.
    pub cards: BTreeMap<String, u32>,
    pub taken_at: DateTime<Utc>,
}
