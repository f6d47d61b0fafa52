//! Run outcomes and their wire shape.

use crate::error::{CrawlError, CrawlFailure};
use metadeck_types::RunDiagnostics;
use serde::{Deserialize, Serialize};

/// Message reported when a run saw no usable battle.
pub const NO_VALID_BATTLES: &str = "No valid battles found";

/// Non-fatal end of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlOutcome {
    /// Summaries were computed and persisted.
    Completed(CrawlReport),
    /// The run finished but no valid battle was seen; storage was not touched.
    NoValidBattles { diagnostics: RunDiagnostics },
}

impl CrawlOutcome {
    pub fn diagnostics(&self) -> &RunDiagnostics {
        match self {
            CrawlOutcome::Completed(report) => &report.diagnostics,
            CrawlOutcome::NoValidBattles { diagnostics } => diagnostics,
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlReport {
    pub total_seen: u64,
    /// Distinct decks observed, before capping.
    pub unique_decks: usize,
    /// Summaries actually written.
    pub upserted: usize,
    pub diagnostics: RunDiagnostics,
}

/// JSON result handed to the HTTP layer.
///
/// `{ok:true,totalSeen,uniqueDecks,upserted,diagnostics}` on success,
/// `{ok:false,error,diagnostics}` otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_seen: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_decks: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upserted: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub diagnostics: RunDiagnostics,
}

impl RunResult {
    fn failed(error: String, diagnostics: RunDiagnostics) -> Self {
        Self {
            ok: false,
            total_seen: None,
            unique_decks: None,
            upserted: None,
            error: Some(error),
            diagnostics,
        }
    }
}

impl From<&CrawlOutcome> for RunResult {
    fn from(outcome: &CrawlOutcome) -> Self {
        match outcome {
            CrawlOutcome::Completed(report) => Self {
                ok: true,
                total_seen: Some(report.total_seen),
                unique_decks: Some(report.unique_decks),
                upserted: Some(report.upserted),
                error: None,
                diagnostics: report.diagnostics,
            },
            CrawlOutcome::NoValidBattles { diagnostics } => {
                Self::failed(NO_VALID_BATTLES.to_string(), *diagnostics)
            }
        }
    }
}

impl From<&CrawlFailure> for RunResult {
    fn from(failure: &CrawlFailure) -> Self {
        let message = match &failure.error {
            // The path already names the failed operation.
            CrawlError::Upstream(e) => e.to_string(),
            other => other.to_string(),
        };
        Self::failed(message, failure.diagnostics)
    }
}

impl From<&Result<CrawlOutcome, CrawlFailure>> for RunResult {
    fn from(result: &Result<CrawlOutcome, CrawlFailure>) -> Self {
        match result {
            Ok(outcome) => outcome.into(),
            Err(failure) => failure.into(),
        }
    }
}
