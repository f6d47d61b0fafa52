//! SQLite-backed [`MetaDeckStore`].

use crate::error::{StorageError, StorageResult};
use crate::MetaDeckStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metadeck_types::{CardId, DeckKey, MetaDeckSummary, PlayerSnapshot, PlayerTag};
use rusqlite::{params, Connection, Row};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS meta_decks (
        deck_key TEXT PRIMARY KEY,
        cards TEXT NOT NULL,
        usage_count INTEGER NOT NULL,
        win_count INTEGER NOT NULL,
        win_rate REAL NOT NULL,
        use_rate REAL NOT NULL,
        source TEXT NOT NULL,
        last_seen_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS player_snapshots (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        player_tag TEXT NOT NULL,
        player_name TEXT NOT NULL,
        cards TEXT NOT NULL,
        taken_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_player_snapshots_tag ON player_snapshots(player_tag);
";

const UPSERT_META_DECK: &str = "
    INSERT INTO meta_decks
        (deck_key, cards, usage_count, win_count, win_rate, use_rate, source, last_seen_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
    ON CONFLICT(deck_key) DO UPDATE SET
        cards = excluded.cards,
        usage_count = excluded.usage_count,
        win_count = excluded.win_count,
        win_rate = excluded.win_rate,
        use_rate = excluded.use_rate,
        source = excluded.source,
        last_seen_at = excluded.last_seen_at
";

/// Persistent store backed by a single SQLite connection.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::init(Connection::open(path)?)
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StorageResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs `f` against the connection on the blocking thread pool.
    async fn with_conn<T, F>(&self, f: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> StorageResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| StorageError::Poisoned)?;
            f(&mut guard)
        })
        .await?
    }
}

#[async_trait]
impl MetaDeckStore for SqliteStore {
    async fn upsert_meta_decks(&self, decks: &[MetaDeckSummary]) -> StorageResult<usize> {
        let rows = decks
            .iter()
            .map(|d| Ok((d.clone(), serde_json::to_string(&d.cards)?)))
            .collect::<StorageResult<Vec<_>>>()?;

        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare_cached(UPSERT_META_DECK)?;
                for (deck, cards_json) in &rows {
                    stmt.execute(params![
                        deck.deck_key.as_str(),
                        cards_json,
                        deck.usage_count as i64,
                        deck.win_count as i64,
                        deck.win_rate,
                        deck.use_rate,
                        deck.source,
                        deck.last_seen_at.to_rfc3339(),
                    ])?;
                }
            }
            tx.commit()?;
            debug!("Upserted {} meta decks", rows.len());
            Ok(rows.len())
        })
        .await
    }

    async fn top_meta_decks(&self, limit: usize) -> StorageResult<Vec<MetaDeckSummary>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT deck_key, cards, usage_count, win_count, win_rate, use_rate, source, last_seen_at
                 FROM meta_decks ORDER BY usage_count DESC, deck_key ASC LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit as i64], read_meta_deck_row)?;

            let mut decks = Vec::new();
            for row in rows {
                let (deck_key, cards, usage, wins, win_rate, use_rate, source, seen) = row?;
                let cards: Vec<CardId> = serde_json::from_str(&cards)?;
                decks.push(MetaDeckSummary {
                    deck_key: DeckKey::from_stored(deck_key),
                    cards,
                    usage_count: usage as u64,
                    win_count: wins as u64,
                    win_rate,
                    use_rate,
                    source,
                    last_seen_at: parse_timestamp(&seen)?,
                });
            }
            Ok(decks)
        })
        .await
    }

    async fn insert_snapshot(&self, snapshot: &PlayerSnapshot) -> StorageResult<()> {
        let cards = serde_json::to_string(&snapshot.cards)?;
        let snapshot = snapshot.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO player_snapshots (user_id, player_tag, player_name, cards, taken_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    snapshot.user_id,
                    snapshot.player_tag.as_str(),
                    snapshot.player_name,
                    cards,
                    snapshot.taken_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn snapshots_for(&self, tag: &PlayerTag) -> StorageResult<Vec<PlayerSnapshot>> {
        let tag = tag.clone();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, player_tag, player_name, cards, taken_at
                 FROM player_snapshots WHERE player_tag = ?1 ORDER BY id DESC",
            )?;
            let rows = stmt.query_map(params![tag.as_str()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?;

            let mut snapshots = Vec::new();
            for row in rows {
                let (user_id, player_tag, player_name, cards, taken_at) = row?;
                let cards: BTreeMap<String, u32> = serde_json::from_str(&cards)?;
                snapshots.push(PlayerSnapshot {
                    user_id,
                    player_tag: PlayerTag::new(&player_tag),
                    player_name,
                    cards,
                    taken_at: parse_timestamp(&taken_at)?,
                });
            }
            Ok(snapshots)
        })
        .await
    }

    async fn ping(&self) -> StorageResult<()> {
        self.with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM meta_decks", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
        .await
    }
}

type MetaDeckRow = (String, String, i64, i64, f64, f64, String, String);

fn read_meta_deck_row(row: &Row<'_>) -> rusqlite::Result<MetaDeckRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn parse_timestamp(raw: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::InvalidData(format!("bad timestamp {raw:?}: {e}")))
}
