//! Upstream game API client.
//!
//! Every request carries the bearer token from [`CrawlerConfig`]. Non-success
//! responses are turned into [`UpstreamError`] using the provider's `reason`
//! (or `message`) field when the body is JSON, and a generic status message
//! otherwise. There are no retries here; callers decide whether a failure is
//! fatal.

use crate::config::CrawlerConfig;
use crate::error::{CrawlError, CrawlResult, FetchResult, UpstreamError};
use async_trait::async_trait;
use metadeck_types::{CardId, PlayerTag, RankedPlayer};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Player profile as returned by `GET /players/{tag}`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerProfile {
    pub tag: PlayerTag,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cards: Vec<OwnedCard>,
}

/// A card in a player's collection.
#[derive(Debug, Clone, Deserialize)]
pub struct OwnedCard {
    pub id: CardId,
    #[serde(default)]
    pub level: u32,
}

#[derive(Debug, Deserialize)]
struct RankingPage {
    #[serde(default)]
    items: Vec<RankedPlayer>,
}

/// Access to the upstream game API.
///
/// Implementors only need [`RoyaleApi::fetch`]; the typed calls decode its
/// JSON body.
#[async_trait]
pub trait RoyaleApi: Send + Sync {
    /// GETs `path` (relative to the API base) and returns the JSON body.
    async fn fetch(&self, path: &str) -> FetchResult<Value>;

    /// Top of the global ladder, in upstream ranking order.
    async fn ranked_players(&self, limit: usize) -> FetchResult<Vec<RankedPlayer>> {
        let path = format!("/locations/global/rankings/players?limit={limit}");
        let page: RankingPage = decode(&path, self.fetch(&path).await?)?;
        Ok(page.items)
    }

    /// Recent battles of one player. Entries are left undecoded so a single
    /// odd record cannot fail the whole log.
    async fn battle_log(&self, tag: &PlayerTag) -> FetchResult<Vec<Value>> {
        let path = format!("/players/{}/battlelog", tag.url_segment());
        match self.fetch(&path).await? {
            Value::Array(battles) => Ok(battles),
            other => Err(UpstreamError::new(
                path,
                None,
                format!("expected a battle list, got {}", json_kind(&other)),
            )),
        }
    }

    /// Profile (including card levels) of one player.
    async fn player(&self, tag: &PlayerTag) -> FetchResult<PlayerProfile> {
        let path = format!("/players/{}", tag.url_segment());
        decode(&path, self.fetch(&path).await?)
    }
}

/// HTTP implementation of [`RoyaleApi`].
#[derive(Clone)]
pub struct RoyaleClient {
    client: Client,
    base_url: String,
    token: String,
}

impl RoyaleClient {
    /// Builds a client from the crawler configuration.
    pub fn new(config: &CrawlerConfig) -> CrawlResult<Self> {
        if config.api_token.trim().is_empty() {
            return Err(CrawlError::Config("missing API token".to_string()));
        }

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| CrawlError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl RoyaleApi for RoyaleClient {
    async fn fetch(&self, path: &str) -> FetchResult<Value> {
        debug!("GET {}", path);

        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| UpstreamError::new(path, None, format!("request failed: {e}")))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            UpstreamError::new(path, Some(status.as_u16()), format!("failed to read body: {e}"))
        })?;
        let body = serde_json::from_str::<Value>(&text).ok();

        if !status.is_success() {
            let reason = body
                .as_ref()
                .and_then(provider_reason)
                .unwrap_or_else(|| format!("CR API error {}", status.as_u16()));
            return Err(UpstreamError::new(path, Some(status.as_u16()), reason));
        }

        body.ok_or_else(|| {
            UpstreamError::new(path, Some(status.as_u16()), "response body is not JSON")
        })
    }
}

/// Pulls the provider's explanation out of an error body.
fn provider_reason(body: &Value) -> Option<String> {
    ["reason", "message"]
        .iter()
        .filter_map(|field| body.get(*field).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn decode<T: DeserializeOwned>(path: &str, body: Value) -> FetchResult<T> {
    serde_json::from_value(body)
        .map_err(|e| UpstreamError::new(path, None, format!("unexpected response shape: {e}")))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
