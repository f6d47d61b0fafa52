//! Meta-deck crawler.
//!
//! Samples the top of the global ladder, walks each player's recent battle
//! log, extracts the 8-card deck used in every battle and aggregates usage
//! and win statistics into a capped leaderboard that is upserted into a
//! [`MetaDeckStore`](metadeck_store::MetaDeckStore).
//!
//! ## Components
//!
//! - **Client**: authenticated upstream calls with provider error reasons
//! - **Pacing**: minimum-interval gate between battle-log requests
//! - **Battle**: per-record normalization into a canonical deck key
//! - **Aggregate**: run-scoped counters, ranking and capping
//! - **Crawler**: the end-to-end run, diagnostics and cancellation
//!
//! # Example
//!
//! ```no_run
//! use metadeck_crawler::{CrawlerConfig, MetaCrawler, RoyaleClient, RunResult};
//! use metadeck_store::SqliteStore;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CrawlerConfig {
//!     api_token: "token".to_string(),
//!     ..Default::default()
//! };
//! let api = Arc::new(RoyaleClient::new(&config)?);
//! let store = Arc::new(SqliteStore::open("meta.db")?);
//!
//! let crawler = MetaCrawler::new(api, store, config);
//! let result = crawler.run(Some(30), CancellationToken::new()).await;
//! println!("{}", serde_json::to_string(&RunResult::from(&result))?);
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod battle;
pub mod client;
mod config;
mod crawler;
mod error;
mod outcome;
pub mod pacing;
mod profile;

pub use aggregate::{DeckAggregator, Provenance};
pub use battle::{
    normalize_battle, normalize_value, BattleRecord, DeckObservation, Normalized, SkipReason,
};
pub use client::{PlayerProfile, RoyaleApi, RoyaleClient};
pub use config::{CrawlerConfig, DEFAULT_PLAYER_LIMIT, DEFAULT_SUMMARY_CAP, TOP_LADDER_SOURCE};
pub use crawler::MetaCrawler;
pub use error::{CrawlError, CrawlFailure, CrawlResult, FetchResult, UpstreamError};
pub use outcome::{CrawlOutcome, CrawlReport, RunResult, NO_VALID_BATTLES};
pub use pacing::{MinIntervalGate, NoPacing, Pacer};
pub use profile::sync_player;
