//! HTTP API for triggering crawls and player snapshots.
//!
//! | Route                  | Purpose                                   |
//! |------------------------|-------------------------------------------|
//! | `POST /api/crawl-meta` | one meta-deck run, `{limitPlayers?}`      |
//! | `POST /api/sync`       | snapshot one player, `{playerTag,userId}` |
//! | `GET /api/meta-decks`  | stored leaderboard, `?limit=N`            |
//! | `GET /api/db-test`     | storage liveness                          |
//! | `POST /api/debug-one`  | battle sample of the top player           |
//! | `GET /api/locations`   | upstream location list                    |

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use metadeck_crawler::{
    CrawlError, CrawlFailure, CrawlOutcome, CrawlerConfig, MetaCrawler, RoyaleApi, RunResult,
    sync_player,
};
use metadeck_store::MetaDeckStore;
use metadeck_types::{MetaDeckSummary, PlayerSnapshot};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Default and maximum page size for `GET /api/meta-decks`.
pub const DEFAULT_DECK_PAGE: usize = 50;
pub const MAX_DECK_PAGE: usize = 200;

/// Players requested by `POST /api/debug-one` when the body does not say.
pub const DEFAULT_DEBUG_PLAYERS: usize = 10;

/// Battles summarized by `POST /api/debug-one`.
const DEBUG_SAMPLE_SIZE: usize = 3;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    crawler: Arc<MetaCrawler>,
    api: Arc<dyn RoyaleApi>,
    store: Arc<dyn MetaDeckStore>,
    /// Held for the duration of a crawl; one run per process.
    run_lock: Arc<Mutex<()>>,
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        api: Arc<dyn RoyaleApi>,
        store: Arc<dyn MetaDeckStore>,
        config: CrawlerConfig,
        shutdown: CancellationToken,
    ) -> Self {
        let crawler = MetaCrawler::new(api.clone(), store.clone(), config);
        Self {
            crawler: Arc::new(crawler),
            api,
            store,
            run_lock: Arc::new(Mutex::new(())),
            shutdown,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlRequest {
    pub limit_players: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    #[serde(default)]
    pub player_tag: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SyncResponse {
    pub ok: bool,
    pub snapshot: PlayerSnapshot,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaDecksResponse {
    pub ok: bool,
    pub decks: Vec<MetaDeckSummary>,
}

#[derive(Debug, Deserialize)]
pub struct MetaDecksQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub error: String,
}

/// Shape of one battle-log entry, as far as deck extraction cares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleSample {
    #[serde(rename = "type")]
    pub battle_type: Option<String>,
    pub game_mode: Option<String>,
    pub team_has_cards: bool,
    pub team_cards_len: Option<usize>,
    pub opp_cards_len: Option<usize>,
    pub team_crowns: Option<u64>,
    pub opp_crowns: Option<u64>,
}

impl BattleSample {
    pub fn from_raw(battle: &Value) -> Self {
        let team_cards = battle.pointer("/team/0/cards").and_then(Value::as_array);
        Self {
            battle_type: battle.get("type").and_then(Value::as_str).map(str::to_string),
            game_mode: battle
                .pointer("/gameMode/name")
                .and_then(Value::as_str)
                .map(str::to_string),
            team_has_cards: team_cards.is_some(),
            team_cards_len: team_cards.map(Vec::len),
            opp_cards_len: battle
                .pointer("/opponent/0/cards")
                .and_then(Value::as_array)
                .map(Vec::len),
            team_crowns: battle.pointer("/team/0/crowns").and_then(Value::as_u64),
            opp_crowns: battle.pointer("/opponent/0/crowns").and_then(Value::as_u64),
        }
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = ErrorBody {
        ok: false,
        error: message.into(),
    };
    (status, Json(body)).into_response()
}

/// HTTP status for a finished run. Upstream aborts are a bad gateway;
/// "no valid battles" is still a 200 with `ok: false`.
pub fn run_status(result: &Result<CrawlOutcome, CrawlFailure>) -> StatusCode {
    match result {
        Ok(_) => StatusCode::OK,
        Err(failure) => match &failure.error {
            CrawlError::Upstream(_) => StatusCode::BAD_GATEWAY,
            CrawlError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            CrawlError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            CrawlError::Storage(_) | CrawlError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}

/// Decodes an optional JSON body; an empty body is `T::default()`.
fn decode_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, Response> {
    if body.is_empty() {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, format!("invalid body: {e}")))
}

async fn crawl_meta_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let request: CrawlRequest = match decode_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let Ok(_guard) = state.run_lock.try_lock() else {
        warn!("Crawl requested while another run is in progress");
        return error_response(StatusCode::CONFLICT, "crawl already in progress");
    };

    let result = state
        .crawler
        .run(request.limit_players, state.shutdown.child_token())
        .await;
    if let Err(failure) = &result {
        error!("Crawl failed: {}", failure);
    }

    (run_status(&result), Json(RunResult::from(&result))).into_response()
}

async fn sync_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let request: SyncRequest = match decode_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let player_tag = request.player_tag.unwrap_or_default();
    let user_id = request.user_id.unwrap_or_default();

    match sync_player(state.api.as_ref(), state.store.as_ref(), &player_tag, &user_id).await {
        Ok(snapshot) => {
            info!("Stored snapshot for {}", snapshot.player_tag);
            Json(SyncResponse { ok: true, snapshot }).into_response()
        }
        Err(CrawlError::InvalidInput(message)) => error_response(StatusCode::BAD_REQUEST, message),
        Err(e) => {
            error!("Sync failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn meta_decks_handler(
    State(state): State<AppState>,
    Query(query): Query<MetaDecksQuery>,
) -> Response {
    let limit = query.limit.unwrap_or(DEFAULT_DECK_PAGE).min(MAX_DECK_PAGE);
    match state.store.top_meta_decks(limit).await {
        Ok(decks) => Json(MetaDecksResponse { ok: true, decks }).into_response(),
        Err(e) => {
            error!("Reading meta decks failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn db_test_handler(State(state): State<AppState>) -> Response {
    match state.store.ping().await {
        Ok(()) => Json(json!({ "ok": true })).into_response(),
        Err(e) => {
            error!("Storage check failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn debug_one_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let request: CrawlRequest = match decode_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let limit = request.limit_players.unwrap_or(DEFAULT_DEBUG_PLAYERS).max(1);

    let players = match state.api.ranked_players(limit).await {
        Ok(players) => players,
        Err(e) => return error_response(StatusCode::BAD_GATEWAY, e.to_string()),
    };
    let Some(first) = players.into_iter().next() else {
        return Json(json!({ "ok": true, "note": "No players returned" })).into_response();
    };

    let battles = match state.api.battle_log(&first.tag).await {
        Ok(battles) => battles,
        Err(e) => {
            warn!("Debug battlelog failed for {}: {}", first.tag, e);
            return Json(json!({ "ok": false, "note": "Battlelog not available for first player" }))
                .into_response();
        }
    };
    let sample: Vec<BattleSample> = battles
        .iter()
        .take(DEBUG_SAMPLE_SIZE)
        .map(BattleSample::from_raw)
        .collect();

    Json(json!({
        "ok": true,
        "firstPlayer": first,
        "battlesCount": battles.len(),
        "sample": sample,
    }))
    .into_response()
}

async fn locations_handler(State(state): State<AppState>) -> Response {
    match state.api.fetch("/locations").await {
        Ok(locations) => Json(json!({ "ok": true, "locations": locations })).into_response(),
        Err(e) => {
            error!("Locations fetch failed: {}", e);
            error_response(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

/// Build the HTTP API router with the given state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/crawl-meta", post(crawl_meta_handler))
        .route("/api/sync", post(sync_handler))
        .route("/api/meta-decks", get(meta_decks_handler))
        .route("/api/db-test", get(db_test_handler))
        .route("/api/debug-one", post(debug_one_handler))
        .route("/api/locations", get(locations_handler))
        .with_state(state)
}
