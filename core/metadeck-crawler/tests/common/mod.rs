//! Shared fixtures for crawler tests.
#![allow(dead_code)]

use async_trait::async_trait;
use metadeck_crawler::{FetchResult, RoyaleApi, UpstreamError};
use metadeck_store::{MetaDeckStore, StorageError, StorageResult};
use metadeck_types::{MetaDeckSummary, PlayerSnapshot, PlayerTag};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const DECK_A: [u64; 8] = [
    26000000, 26000001, 26000002, 26000003, 26000004, 26000005, 26000006, 26000007,
];
pub const DECK_B: [u64; 8] = [
    26000010, 26000011, 26000012, 26000013, 26000014, 26000015, 26000016, 26000017,
];
pub const DECK_C: [u64; 8] = [
    28000000, 28000001, 28000002, 28000003, 28000004, 28000005, 28000006, 28000007,
];

/// A battle-log entry shaped like the provider's.
pub fn battle(cards: &[u64], my_crowns: u32, their_crowns: u32) -> Value {
    let cards: Vec<Value> = cards.iter().map(|id| json!({"id": id, "level": 11})).collect();
    json!({
        "type": "PvP",
        "battleTime": "20260301T120000.000Z",
        "team": [{"tag": "#ME", "crowns": my_crowns, "cards": cards}],
        "opponent": [{"tag": "#THEM", "crowns": their_crowns, "cards": []}]
    })
}

pub fn ranking(tags: &[&str]) -> Value {
    let items: Vec<Value> = tags
        .iter()
        .enumerate()
        .map(|(i, tag)| json!({"tag": tag, "name": format!("Player {}", i + 1), "rank": i + 1}))
        .collect();
    json!({ "items": items })
}

pub fn battlelog_path(tag: &str) -> String {
    format!("/players/{}/battlelog", PlayerTag::new(tag).url_segment())
}

// ── Scripted upstream ────────────────────────────────────────────

/// In-process upstream answering from a path → response table.
#[derive(Default)]
pub struct ScriptedApi {
    responses: HashMap<String, FetchResult<Value>>,
    latency: Option<Duration>,
    cancel_on: Option<(String, CancellationToken)>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, path: impl Into<String>, body: Value) -> Self {
        self.responses.insert(path.into(), Ok(body));
        self
    }

    pub fn fail(mut self, path: impl Into<String>, status: u16) -> Self {
        let path = path.into();
        let err = UpstreamError::new(path.clone(), Some(status), format!("CR API error {status}"));
        self.responses.insert(path, Err(err));
        self
    }

    /// Every fetch takes this long (in tokio time).
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Cancels `token` while serving `path`.
    pub fn cancel_on(mut self, path: impl Into<String>, token: CancellationToken) -> Self {
        self.cancel_on = Some((path.into(), token));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RoyaleApi for ScriptedApi {
    async fn fetch(&self, path: &str) -> FetchResult<Value> {
        self.calls.lock().unwrap().push(path.to_string());
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some((trigger, token)) = &self.cancel_on {
            if trigger == path {
                token.cancel();
            }
        }
        self.responses
            .get(path)
            .cloned()
            .unwrap_or_else(|| Err(UpstreamError::new(path, Some(404), "notFound")))
    }
}

// ── Stores ───────────────────────────────────────────────────────

/// Keeps every upsert batch in memory.
#[derive(Default)]
pub struct RecordingStore {
    batches: Mutex<Vec<Vec<MetaDeckSummary>>>,
}

impl RecordingStore {
    pub fn batches(&self) -> Vec<Vec<MetaDeckSummary>> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetaDeckStore for RecordingStore {
    async fn upsert_meta_decks(&self, decks: &[MetaDeckSummary]) -> StorageResult<usize> {
        self.batches.lock().unwrap().push(decks.to_vec());
        Ok(decks.len())
    }

    async fn top_meta_decks(&self, limit: usize) -> StorageResult<Vec<MetaDeckSummary>> {
        let batches = self.batches.lock().unwrap();
        Ok(batches.last().map(|b| b.iter().take(limit).cloned().collect()).unwrap_or_default())
    }

    async fn insert_snapshot(&self, _snapshot: &PlayerSnapshot) -> StorageResult<()> {
        Ok(())
    }

    async fn snapshots_for(&self, _tag: &PlayerTag) -> StorageResult<Vec<PlayerSnapshot>> {
        Ok(Vec::new())
    }

    async fn ping(&self) -> StorageResult<()> {
        Ok(())
    }
}

/// Rejects every write.
#[derive(Default)]
pub struct FailingStore;

#[async_trait]
impl MetaDeckStore for FailingStore {
    async fn upsert_meta_decks(&self, _decks: &[MetaDeckSummary]) -> StorageResult<usize> {
        Err(StorageError::InvalidData("disk full".into()))
    }

    async fn top_meta_decks(&self, _limit: usize) -> StorageResult<Vec<MetaDeckSummary>> {
        Ok(Vec::new())
    }

    async fn insert_snapshot(&self, _snapshot: &PlayerSnapshot) -> StorageResult<()> {
        Err(StorageError::InvalidData("disk full".into()))
    }

    async fn snapshots_for(&self, _tag: &PlayerTag) -> StorageResult<Vec<PlayerSnapshot>> {
        Ok(Vec::new())
    }

    async fn ping(&self) -> StorageResult<()> {
        Err(StorageError::InvalidData("disk full".into()))
    }
}
