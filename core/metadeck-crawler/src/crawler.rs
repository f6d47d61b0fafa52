//! Sync orchestrator: one end-to-end meta-deck pass.
//!
//! ```text
//! FetchingPlayers ──err──▶ Aborted
//!       │
//!       ▼
//! IteratingPlayers ──▶ per player: FetchingBattlelog ─▶ NormalizingBattles
//!       │                          (failure: count, log, next player)
//!       ▼
//! Finalizing ──▶ Done
//! ```
//!
//! All aggregation state lives in a [`DeckAggregator`] created inside
//! [`MetaCrawler::run`], so runs never share state.

use crate::aggregate::{DeckAggregator, Provenance};
use crate::battle::{normalize_value, Normalized};
use crate::client::RoyaleApi;
use crate::config::CrawlerConfig;
use crate::error::{CrawlError, CrawlFailure, FetchResult};
use crate::outcome::{CrawlOutcome, CrawlReport};
use crate::pacing::{MinIntervalGate, Pacer};
use futures::StreamExt;
use futures::stream;
use metadeck_store::MetaDeckStore;
use metadeck_types::{RankedPlayer, RunDiagnostics};
use serde_json::Value;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Result of one player's battle-log step.
enum PlayerStep {
    Fetched {
        index: usize,
        player: RankedPlayer,
        battles: FetchResult<Vec<Value>>,
    },
    /// Cancellation was observed before the fetch started.
    NotStarted,
}

/// Aborts the run-timeout timer when the run ends first.
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Drives crawl runs against an upstream API and a store.
pub struct MetaCrawler {
    api: Arc<dyn RoyaleApi>,
    store: Arc<dyn MetaDeckStore>,
    pacer: Arc<dyn Pacer>,
    config: CrawlerConfig,
}

impl MetaCrawler {
    /// Creates a crawler paced by a [`MinIntervalGate`] built from the config.
    pub fn new(
        api: Arc<dyn RoyaleApi>,
        store: Arc<dyn MetaDeckStore>,
        config: CrawlerConfig,
    ) -> Self {
        let pacer = Arc::new(MinIntervalGate::new(config.pacing_interval()));
        Self::with_pacer(api, store, pacer, config)
    }

    /// Creates a crawler with a custom pacing policy.
    pub fn with_pacer(
        api: Arc<dyn RoyaleApi>,
        store: Arc<dyn MetaDeckStore>,
        pacer: Arc<dyn Pacer>,
        config: CrawlerConfig,
    ) -> Self {
        Self {
            api,
            store,
            pacer,
            config,
        }
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    /// Runs one crawl.
    ///
    /// `player_limit` overrides the configured sample size. Cancelling
    /// `cancel` stops the run before the next player; fetches already in
    /// flight finish first. A cancelled run persists nothing.
    pub async fn run(
        &self,
        player_limit: Option<usize>,
        cancel: CancellationToken,
    ) -> Result<CrawlOutcome, CrawlFailure> {
        let mut diagnostics = RunDiagnostics::default();

        let limit = player_limit.unwrap_or(self.config.player_limit);
        if limit == 0 {
            return Err(CrawlFailure::new(
                CrawlError::InvalidInput("player limit must be at least 1".to_string()),
                diagnostics,
            ));
        }

        let cancel = cancel.child_token();
        let _timer = self.config.run_timeout().map(|timeout| {
            let token = cancel.clone();
            AbortOnDrop(tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                warn!("Run timed out after {:?}, cancelling", timeout);
                token.cancel();
            }))
        });

        if cancel.is_cancelled() {
            diagnostics.cancelled = true;
            return Err(CrawlFailure::new(CrawlError::Cancelled, diagnostics));
        }

        // FetchingPlayers
        info!("Fetching top {} global players", limit);
        let players = match self.api.ranked_players(limit).await {
            Ok(players) => players,
            Err(e) => {
                warn!("Ranking fetch failed, aborting run: {}", e);
                return Err(CrawlFailure::new(e, diagnostics));
            }
        };
        info!("Found {} players", players.len());

        // IteratingPlayers
        let total = players.len();
        let mut aggregator = DeckAggregator::new();
        let mut steps = stream::iter(players.into_iter().enumerate())
            .map(|(index, player)| self.fetch_battle_log(index, player, &cancel))
            .buffered(self.config.max_concurrency.max(1));

        while let Some(step) = steps.next().await {
            match step {
                PlayerStep::NotStarted => diagnostics.cancelled = true,
                PlayerStep::Fetched {
                    index,
                    player,
                    battles,
                } => {
                    diagnostics.players_processed += 1;
                    info!(
                        "Processing {}/{}: {} ({})",
                        index + 1,
                        total,
                        player.name,
                        player.tag
                    );
                    match battles {
                        Ok(battles) => {
                            diagnostics.successful_battlelogs += 1;
                            ingest_battles(&battles, &mut aggregator, &mut diagnostics);
                        }
                        Err(e) => {
                            diagnostics.failed_battlelogs += 1;
                            warn!("Battlelog failed for {}: {}", player.tag, e);
                        }
                    }
                }
            }
        }
        drop(steps);

        diagnostics.total_valid_battles = aggregator.observed();
        log_summary(&diagnostics, aggregator.unique_decks());

        if diagnostics.cancelled {
            warn!(
                "Run cancelled after {} of {} players; nothing persisted",
                diagnostics.players_processed, total
            );
            return Err(CrawlFailure::new(CrawlError::Cancelled, diagnostics));
        }

        // Finalizing
        let total_seen = aggregator.observed();
        if total_seen == 0 {
            warn!("No valid battles found; storage untouched");
            return Ok(CrawlOutcome::NoValidBattles { diagnostics });
        }

        let unique_decks = aggregator.unique_decks();
        let provenance = Provenance::now(self.config.source.clone());
        let summaries = aggregator.finalize(total_seen, self.config.summary_cap, &provenance);

        info!("Upserting {} decks", summaries.len());
        let upserted = match self.store.upsert_meta_decks(&summaries).await {
            Ok(count) => count,
            Err(e) => {
                warn!("Meta deck upsert failed: {}", e);
                return Err(CrawlFailure::new(e, diagnostics));
            }
        };
        info!("Upserted {} decks", upserted);

        Ok(CrawlOutcome::Completed(CrawlReport {
            total_seen,
            unique_decks,
            upserted,
            diagnostics,
        }))
    }

    /// FetchingBattlelog for one player, bracketed by the pacer.
    async fn fetch_battle_log(
        &self,
        index: usize,
        player: RankedPlayer,
        cancel: &CancellationToken,
    ) -> PlayerStep {
        if cancel.is_cancelled() {
            return PlayerStep::NotStarted;
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return PlayerStep::NotStarted,
            _ = self.pacer.acquire() => {}
        }

        let battles = self.api.battle_log(&player.tag).await;
        self.pacer.release();

        PlayerStep::Fetched {
            index,
            player,
            battles,
        }
    }
}

/// NormalizingBattles: feeds valid battles to the aggregator, counts skips.
fn ingest_battles(
    battles: &[Value],
    aggregator: &mut DeckAggregator,
    diagnostics: &mut RunDiagnostics,
) {
    let mut valid = 0usize;
    for raw in battles {
        match normalize_value(raw) {
            Normalized::Deck(deck) => {
                valid += 1;
                aggregator.observe(deck);
            }
            Normalized::Skip(reason) => {
                diagnostics.skipped_battles += 1;
                debug!("Skipping battle: {}", reason);
            }
        }
    }
    debug!("Valid battles: {}/{}", valid, battles.len());
}

fn log_summary(diagnostics: &RunDiagnostics, unique_decks: usize) {
    info!(
        players_processed = diagnostics.players_processed,
        successful_battlelogs = diagnostics.successful_battlelogs,
        failed_battlelogs = diagnostics.failed_battlelogs,
        total_valid_battles = diagnostics.total_valid_battles,
        skipped_battles = diagnostics.skipped_battles,
        unique_decks,
        "Crawl summary"
    );
}
