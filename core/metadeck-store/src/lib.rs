//! Persistence collaborator for the meta-deck crawler.
//!
//! The crawler only ever talks to [`MetaDeckStore`]; [`SqliteStore`] is the
//! bundled implementation. Meta-deck rows are upserted by deck key, so a
//! later run's summary for the same deck replaces the earlier one.

mod error;
mod sqlite;

pub use error::{StorageError, StorageResult};
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use metadeck_types::{MetaDeckSummary, PlayerSnapshot, PlayerTag};

/// Storage operations used by the crawler and the HTTP service.
#[async_trait]
pub trait MetaDeckStore: Send + Sync {
    /// Writes all summaries in one transaction, conflict-resolved on deck key.
    /// Within a batch the last record for a key wins. Returns the number of
    /// records written.
    async fn upsert_meta_decks(&self, decks: &[MetaDeckSummary]) -> StorageResult<usize>;

    /// Returns the stored leaderboard ordered by usage count, highest first.
    async fn top_meta_decks(&self, limit: usize) -> StorageResult<Vec<MetaDeckSummary>>;

    /// Appends a player snapshot.
    async fn insert_snapshot(&self, snapshot: &PlayerSnapshot) -> StorageResult<()>;

    /// Returns every snapshot taken for a player, newest first.
    async fn snapshots_for(&self, tag: &PlayerTag) -> StorageResult<Vec<PlayerSnapshot>>;

    /// Cheap round trip used by health checks.
    async fn ping(&self) -> StorageResult<()>;
}
