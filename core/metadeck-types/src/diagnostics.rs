use serde::{Deserialize, Serialize};

/// Run-level counters. Returned with every run outcome, never persisted.
///
/// `skipped_battles` counts malformed battle entries; `failed_battlelogs`
/// counts whole battle-log fetches that errored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunDiagnostics {
    pub players_processed: u32,
    pub successful_battlelogs: u32,
    pub failed_battlelogs: u32,
    pub total_valid_battles: u64,
    pub skipped_battles: u64,
    pub cancelled: bool,
}
