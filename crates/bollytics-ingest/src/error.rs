use std::path::PathBuf;

use bollytics_analytics::ReportError;
use bollytics_core::{Category, Lookback, ValidationError};
use bollytics_db::DbError;
use bollytics_reddit::RedditError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    /// One fetch failed; the whole cycle is abandoned before any write.
    #[error("fetch failed for {source_name}/{category} ({lookback}): {error}")]
    UpstreamFetch {
        source_name: String,
        category: Category,
        lookback: Lookback,
        #[source]
        error: RedditError,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The ingest transaction failed or overran its deadline and was rolled back.
    #[error("storage error: {0}")]
    Storage(#[from] DbError),

    /// A trend report could not be computed for one source.
    #[error("trend report failed: {0}")]
    Report(#[from] ReportError),

    #[error("failed to write {path}: {error}")]
    Export {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    #[error("failed to encode trend export: {0}")]
    Encode(#[from] serde_json::Error),
}
