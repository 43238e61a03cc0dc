//! One ingestion cycle: fetch everything, then merge and prune in one transaction.

use std::time::Duration;

use bollytics_core::{AppConfig, Category, Lookback, NewPost, Sources, ValidationError};
use bollytics_db::{apply_ingest_batch, with_deadline, IngestSummary};
use bollytics_reddit::{normalize_item, PostFetcher};
use sqlx::PgPool;

use crate::error::IngestError;

#[derive(Debug, Clone)]
pub struct IngestSettings {
    pub lookbacks: Vec<Lookback>,
    pub fetch_limit: u32,
    pub retention_days: u32,
    /// Deadline for the merge-and-prune transaction.
    pub ingest_timeout: Duration,
}

impl IngestSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            lookbacks: config.lookbacks.clone(),
            fetch_limit: config.fetch_limit,
            retention_days: config.retention_days,
            ingest_timeout: Duration::from_secs(config.ingest_timeout_secs),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Candidates produced by the normalizer, including repeats of one id.
    pub fetched: u64,
    pub inserted: u64,
    pub updated: u64,
    pub unchanged: u64,
    pub pruned: u64,
}

impl CycleSummary {
    fn from_batch(fetched: u64, batch: IngestSummary) -> Self {
        Self {
            fetched,
            inserted: batch.inserted,
            updated: batch.updated,
            unchanged: batch.unchanged,
            pruned: batch.pruned,
        }
    }
}

/// Runs one full cycle over every tracked source.
///
/// Every `(source, category, lookback)` listing is fetched and normalized
/// first. Only when all of them succeed are the candidates merged, in fetch
/// order, inside a single transaction that also prunes aged-out posts.
///
/// # Errors
///
/// - [`IngestError::UpstreamFetch`] if any listing cannot be fetched.
/// - [`IngestError::Validation`] if any item lacks a required field.
/// - [`IngestError::Storage`] if the transaction fails or overruns
///   `ingest_timeout`; nothing is committed in that case.
pub async fn run_ingestion_cycle<F: PostFetcher>(
    pool: &PgPool,
    fetcher: &F,
    sources: &Sources,
    settings: &IngestSettings,
) -> Result<CycleSummary, IngestError> {
    tracing::info!(
        sources = sources.len(),
        lookbacks = settings.lookbacks.len(),
        "ingestion cycle starting"
    );

    let candidates = collect_candidates(fetcher, sources, settings).await?;
    let fetched = candidates.len() as u64;

    let batch = with_deadline(
        settings.ingest_timeout,
        apply_ingest_batch(pool, candidates, settings.retention_days),
    )
    .await?;

    let summary = CycleSummary::from_batch(fetched, batch);
    tracing::info!(
        fetched = summary.fetched,
        inserted = summary.inserted,
        updated = summary.updated,
        unchanged = summary.unchanged,
        pruned = summary.pruned,
        "ingestion cycle complete"
    );
    Ok(summary)
}

async fn collect_candidates<F: PostFetcher>(
    fetcher: &F,
    sources: &Sources,
    settings: &IngestSettings,
) -> Result<Vec<NewPost>, IngestError> {
    let mut candidates = Vec::new();

    for source in sources.names() {
        for category in Category::ALL {
            for &lookback in &settings.lookbacks {
                let items = fetcher
                    .fetch(source, category, lookback, settings.fetch_limit)
                    .await
                    .map_err(|error| IngestError::UpstreamFetch {
                        source_name: source.to_string(),
                        category,
                        lookback,
                        error,
                    })?;

                tracing::debug!(
                    source,
                    category = category.as_str(),
                    lookback = lookback.as_str(),
                    count = items.len(),
                    "fetched listing"
                );

                for raw in items {
                    let post = normalize_item(raw, category)?;
                    candidates.push(attribute_to_source(post, source)?);
                }
            }
        }
    }

    Ok(candidates)
}

/// Stores the post under the configured spelling of its source so reads,
/// which match the configured name exactly, find it.
fn attribute_to_source(mut post: NewPost, source: &str) -> Result<NewPost, ValidationError> {
    if !post.source.eq_ignore_ascii_case(source) {
        return Err(ValidationError::InvalidField {
            id: post.id,
            field: "subreddit",
            reason: format!("'{}' listed under '{source}'", post.source),
        });
    }
    source.clone_into(&mut post.source);
    Ok(post)
}
