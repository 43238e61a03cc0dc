//! Background job scheduler.
//!
//! Registers the daily ingestion tick and the trend export tick. Job errors
//! are logged and the job waits for its next tick.

use std::path::PathBuf;
use std::sync::Arc;

use bollytics_analytics::Reports;
use bollytics_core::AppConfig;
use bollytics_ingest::{run_trend_export, Ingestor};
use bollytics_reddit::RedditClient;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the scheduler.
///
/// Without an `ingestor` (no upstream credentials configured) only the trend
/// export is registered. The returned handle must be kept alive for the
/// lifetime of the process; dropping it stops every job.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised, a
/// cron expression is invalid, or the scheduler fails to start.
pub async fn build_scheduler(
    ingestor: Option<Arc<Ingestor<RedditClient>>>,
    reports: Reports,
    config: &AppConfig,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    match ingestor {
        Some(ingestor) => register_ingest_job(&scheduler, ingestor, &config.ingest_cron).await?,
        None => tracing::warn!("reddit credentials not configured; ingestion job not scheduled"),
    }
    register_trend_export_job(
        &scheduler,
        reports,
        config.trend_export_dir.clone(),
        config.trend_limit,
        &config.trends_cron,
    )
    .await?;

    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_ingest_job(
    scheduler: &JobScheduler,
    ingestor: Arc<Ingestor<RedditClient>>,
    cron: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let ingestor = Arc::clone(&ingestor);

        Box::pin(async move {
            tracing::info!("scheduler: starting ingestion cycle");
            match ingestor.run_cycle().await {
                Ok(Some(summary)) => tracing::info!(
                    inserted = summary.inserted,
                    updated = summary.updated,
                    pruned = summary.pruned,
                    "scheduler: ingestion cycle complete"
                ),
                Ok(None) => tracing::warn!("scheduler: ingestion tick skipped"),
                Err(e) => tracing::error!(error = %e, "scheduler: ingestion cycle failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron, "scheduler: ingestion job registered");
    Ok(())
}

async fn register_trend_export_job(
    scheduler: &JobScheduler,
    reports: Reports,
    dir: PathBuf,
    limit: usize,
    cron: &str,
) -> Result<(), JobSchedulerError> {
    let reports = Arc::new(reports);
    let dir = Arc::new(dir);

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let reports = Arc::clone(&reports);
        let dir = Arc::clone(&dir);

        Box::pin(async move {
            tracing::info!("scheduler: starting trend export");
            match run_trend_export(&reports, &dir, limit).await {
                Ok(summary) if summary.is_complete() => tracing::info!(
                    written = summary.written.len(),
                    "scheduler: trend export complete"
                ),
                Ok(summary) => tracing::warn!(
                    written = summary.written.len(),
                    failed = summary.failures.len(),
                    "scheduler: trend export finished with failures"
                ),
                Err(e) => tracing::error!(error = %e, "scheduler: trend export failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron, "scheduler: trend export job registered");
    Ok(())
}
