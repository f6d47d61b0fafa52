use metadeck_crawler::{
    CrawlError, CrawlFailure, CrawlOutcome, CrawlReport, RunResult, UpstreamError,
    NO_VALID_BATTLES,
};
use metadeck_types::RunDiagnostics;
use pretty_assertions::assert_eq;
use serde_json::json;

fn diagnostics() -> RunDiagnostics {
    RunDiagnostics {
        players_processed: 5,
        successful_battlelogs: 3,
        failed_battlelogs: 2,
        total_valid_battles: 12,
        skipped_battles: 1,
        cancelled: false,
    }
}

#[test]
fn completed_run_serializes_counts() {
    let outcome = CrawlOutcome::Completed(CrawlReport {
        total_seen: 12,
        unique_decks: 4,
        upserted: 4,
        diagnostics: diagnostics(),
    });

    let value = serde_json::to_value(RunResult::from(&outcome)).unwrap();
    assert_eq!(
        value,
        json!({
            "ok": true,
            "totalSeen": 12,
            "uniqueDecks": 4,
            "upserted": 4,
            "diagnostics": {
                "playersProcessed": 5,
                "successfulBattlelogs": 3,
                "failedBattlelogs": 2,
                "totalValidBattles": 12,
                "skippedBattles": 1,
                "cancelled": false
            }
        })
    );
}

#[test]
fn no_valid_battles_serializes_as_failure() {
    let outcome = CrawlOutcome::NoValidBattles {
        diagnostics: RunDiagnostics::default(),
    };

    let value = serde_json::to_value(RunResult::from(&outcome)).unwrap();
    assert_eq!(value["ok"], json!(false));
    assert_eq!(value["error"], json!(NO_VALID_BATTLES));
    assert!(value.get("totalSeen").is_none());
    assert_eq!(value["diagnostics"]["totalValidBattles"], json!(0));
}

#[test]
fn upstream_failure_names_the_path() {
    let failure = CrawlFailure::new(
        UpstreamError::new("/locations/global/rankings/players?limit=30", Some(403), "accessDenied"),
        RunDiagnostics::default(),
    );
    let result: Result<CrawlOutcome, CrawlFailure> = Err(failure);
    let result = RunResult::from(&result);

    assert!(!result.ok);
    assert_eq!(
        result.error.as_deref(),
        Some("/locations/global/rankings/players?limit=30 -> accessDenied")
    );
}

#[test]
fn cancelled_failure_keeps_partial_diagnostics() {
    let mut partial = diagnostics();
    partial.cancelled = true;
    let failure = CrawlFailure::new(CrawlError::Cancelled, partial);

    let result = RunResult::from(&failure);
    assert_eq!(result.error.as_deref(), Some("run cancelled before completion"));
    assert_eq!(result.diagnostics, partial);
}

#[test]
fn run_result_reads_back_from_json() {
    let result: RunResult = serde_json::from_value(json!({
        "ok": false,
        "error": "boom",
        "diagnostics": {
            "playersProcessed": 0,
            "successfulBattlelogs": 0,
            "failedBattlelogs": 0,
            "totalValidBattles": 0,
            "skippedBattles": 0,
            "cancelled": false
        }
    }))
    .unwrap();
    assert_eq!(result.error.as_deref(), Some("boom"));
    assert_eq!(result.upserted, None);
}

#[test]
fn outcome_exposes_diagnostics() {
    let outcome = CrawlOutcome::NoValidBattles {
        diagnostics: diagnostics(),
    };
    assert_eq!(outcome.diagnostics().players_processed, 5);
}
