//! Crawler configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of top-ranked players sampled per run.
pub const DEFAULT_PLAYER_LIMIT: usize = 30;

/// Default maximum number of summaries kept per run.
pub const DEFAULT_SUMMARY_CAP: usize = 200;

/// Provenance tag written on every summary.
pub const TOP_LADDER_SOURCE: &str = "topladder-sampled";

/// Configuration for the crawler and its upstream client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Base URL of the game API, without trailing slash.
    pub api_base_url: String,
    /// Bearer token sent with every upstream request.
    pub api_token: String,
    /// Per-request timeout (seconds).
    pub request_timeout_secs: u64,
    /// Players sampled when the trigger does not say otherwise.
    pub player_limit: usize,
    /// Maximum summaries persisted per run.
    pub summary_cap: usize,
    /// Minimum pause between battle-log requests (ms).
    pub pacing_interval_ms: u64,
    /// Battle logs fetched at once. 1 keeps the run strictly sequential.
    pub max_concurrency: usize,
    /// Provenance tag for produced summaries.
    pub source: String,
    /// Cancels the run between players once exceeded.
    pub run_timeout_secs: Option<u64>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.clashroyale.com/v1".to_string(),
            api_token: String::new(),
            request_timeout_secs: 30,
            player_limit: DEFAULT_PLAYER_LIMIT,
            summary_cap: DEFAULT_SUMMARY_CAP,
            pacing_interval_ms: 100,
            max_concurrency: 1,
            source: TOP_LADDER_SOURCE.to_string(),
            run_timeout_secs: None,
        }
    }
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn pacing_interval(&self) -> Duration {
        Duration::from_millis(self.pacing_interval_ms)
    }

    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout_secs.map(Duration::from_secs)
    }
}
