//! Error types for the crawler.

use metadeck_store::StorageError;
use metadeck_types::RunDiagnostics;
use thiserror::Error;

/// Result type for upstream API calls.
pub type FetchResult<T> = Result<T, UpstreamError>;

/// Result type for crawler operations.
pub type CrawlResult<T> = Result<T, CrawlError>;

/// A failed call to the upstream game API.
///
/// `status` is `None` when no HTTP status was received (connect/timeout) or
/// the body could not be decoded into the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path} -> {reason}")]
pub struct UpstreamError {
    pub path: String,
    pub status: Option<u16>,
    pub reason: String,
}

impl UpstreamError {
    pub fn new(path: impl Into<String>, status: Option<u16>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status,
            reason: reason.into(),
        }
    }
}

/// Errors that can end a crawl or a player sync.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Upstream API failure.
    #[error("upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// Persistence failure.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The run was cancelled (or timed out) between players.
    #[error("run cancelled before completion")]
    Cancelled,

    /// Caller supplied an unusable argument.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Crawler could not be built from its configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// A fatal run outcome, carrying the diagnostics gathered up to the failure.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct CrawlFailure {
    #[source]
    pub error: CrawlError,
    pub diagnostics: RunDiagnostics,
}

impl CrawlFailure {
    pub fn new(error: impl Into<CrawlError>, diagnostics: RunDiagnostics) -> Self {
        Self {
            error: error.into(),
            diagnostics,
        }
    }
}
