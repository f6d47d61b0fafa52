//! Single-player snapshot pathway: fetch one profile, store its card levels.

use crate::client::RoyaleApi;
use crate::error::{CrawlError, CrawlResult};
use chrono::Utc;
use metadeck_store::MetaDeckStore;
use metadeck_types::{PlayerSnapshot, PlayerTag};
use std::collections::BTreeMap;
use tracing::info;

/// Fetches a player's profile and appends a card-level snapshot for `user_id`.
pub async fn sync_player(
    api: &dyn RoyaleApi,
    store: &dyn MetaDeckStore,
    player_tag: &str,
    user_id: &str,
) -> CrawlResult<PlayerSnapshot> {
    if player_tag.trim().is_empty() {
        return Err(CrawlError::InvalidInput("playerTag required".to_string()));
    }
    if user_id.trim().is_empty() {
        return Err(CrawlError::InvalidInput("userId required".to_string()));
    }
    let tag = PlayerTag::parse(player_tag).map_err(|e| CrawlError::InvalidInput(e.to_string()))?;

    let profile = api.player(&tag).await?;
    info!("Fetched player: {} - {}", profile.tag, profile.name);

    let cards: BTreeMap<String, u32> = profile
        .cards
        .iter()
        .map(|card| (card.id.to_string(), card.level))
        .collect();

    let snapshot = PlayerSnapshot {
        user_id: user_id.to_string(),
        player_tag: profile.tag,
        player_name: profile.name,
        cards,
        taken_at: Utc::now(),
    };
    store.insert_snapshot(&snapshot).await?;

    Ok(snapshot)
}
