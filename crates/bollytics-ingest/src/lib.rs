//! Ingestion orchestration: scheduled fetch-merge-prune cycles and the
//! trending-word export.

pub mod cycle;
pub mod error;
pub mod export;
pub mod guard;

use std::sync::Arc;

use bollytics_core::Sources;
use bollytics_reddit::PostFetcher;
use sqlx::PgPool;

pub use cycle::{run_ingestion_cycle, CycleSummary, IngestSettings};
pub use error::IngestError;
pub use export::{run_trend_export, trend_file_path, TrendExportSummary, EXPORT_WINDOW};
pub use guard::{CycleGuard, CycleTicket};

/// Everything a scheduled ingestion tick needs, with overlapping ticks
/// serialized through a shared [`CycleGuard`].
pub struct Ingestor<F> {
    pool: PgPool,
    fetcher: F,
    sources: Arc<Sources>,
    settings: IngestSettings,
    guard: CycleGuard,
}

impl<F: PostFetcher> Ingestor<F> {
    #[must_use]
    pub fn new(pool: PgPool, fetcher: F, sources: Arc<Sources>, settings: IngestSettings) -> Self {
        Self {
            pool,
            fetcher,
            sources,
            settings,
            guard: CycleGuard::new(),
        }
    }

    #[must_use]
    pub fn guard(&self) -> &CycleGuard {
        &self.guard
    }

    /// Runs one cycle unless another is still in progress.
    ///
    /// Returns `Ok(None)` when the tick was skipped.
    ///
    /// # Errors
    ///
    /// Propagates the [`IngestError`] of a failed cycle; nothing from that
    /// cycle is committed.
    pub async fn run_cycle(&self) -> Result<Option<CycleSummary>, IngestError> {
        let Some(_ticket) = self.guard.try_start() else {
            tracing::warn!("ingestion cycle still running, skipping tick");
            return Ok(None);
        };

        let summary =
            run_ingestion_cycle(&self.pool, &self.fetcher, &self.sources, &self.settings).await?;
        Ok(Some(summary))
    }
}
