//! Typed errors for the scraper library.
//!
//! Uses `thiserror` for library errors (not `anyhow`). Fetch and parse
//! failures are contained inside the extractors and degrade to partial
//! results; only [`ScrapeError`] crosses the orchestrator boundary, and
//! realistically only its `Store` variant ever fires.

use thiserror::Error;

/// Errors that can surface from a scrape attempt.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Fetch failed where propagation was required
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Persistence write failed
    #[error("storage error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ScrapeError {
    /// Wrap an arbitrary persistence-layer error.
    pub fn store<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ScrapeError::Store(Box::new(err))
    }
}

/// Errors from the HTTP seam.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// Transport-level failure (DNS, TLS, timeout, connect)
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL could not be parsed or has no host
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Response body was not the JSON the caller expected
    #[error("invalid JSON response: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Result type alias for scrape operations.
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;
