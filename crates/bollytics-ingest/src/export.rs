//! Trending-word export for the word cloud renderer.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use bollytics_analytics::Reports;
use bollytics_core::{WordCount, Window};

use crate::error::IngestError;

/// Window every export covers.
pub const EXPORT_WINDOW: Window = Window::Month;

#[derive(Debug, Default)]
pub struct TrendExportSummary {
    pub written: Vec<PathBuf>,
    /// Sources whose export failed, with the reason. The remaining sources
    /// were still exported.
    pub failures: Vec<(String, IngestError)>,
}

impl TrendExportSummary {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Writes `{dir}/{source}_trending_words.json` for every tracked source.
///
/// A failure for one source is logged and recorded; the export moves on to
/// the next source.
///
/// # Errors
///
/// Returns [`IngestError::Export`] only when `dir` itself cannot be created.
pub async fn run_trend_export(
    reports: &Reports,
    dir: &Path,
    limit: usize,
) -> Result<TrendExportSummary, IngestError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|error| IngestError::Export {
            path: dir.to_path_buf(),
            error,
        })?;

    let mut summary = TrendExportSummary::default();
    for source in reports.sources().names() {
        match export_source(reports, dir, source, limit).await {
            Ok(path) => {
                tracing::info!(source, path = %path.display(), "trend export written");
                summary.written.push(path);
            }
            Err(e) => {
                tracing::error!(source, error = %e, "trend export failed");
                summary.failures.push((source.to_string(), e));
            }
        }
    }
    Ok(summary)
}

async fn export_source(
    reports: &Reports,
    dir: &Path,
    source: &str,
    limit: usize,
) -> Result<PathBuf, IngestError> {
    let words = reports
        .get_trending_words(source, EXPORT_WINDOW.days(), limit)
        .await?;
    write_trend_file(dir, source, &words).await
}

/// Path of the export file for `source` under `dir`.
#[must_use]
pub fn trend_file_path(dir: &Path, source: &str) -> PathBuf {
    dir.join(format!("{source}_trending_words.json"))
}

/// Serializes `{"<source>": [...]}` and swaps it into place, so readers
/// never see a half-written file.
pub(crate) async fn write_trend_file(
    dir: &Path,
    source: &str,
    words: &[WordCount],
) -> Result<PathBuf, IngestError> {
    let mut document = BTreeMap::new();
    document.insert(source, words);
    let body = serde_json::to_vec_pretty(&document)?;

    let path = trend_file_path(dir, source);
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, body)
        .await
        .map_err(|error| IngestError::Export {
            path: tmp.clone(),
            error,
        })?;
    tokio::fs::rename(&tmp, &path)
        .await
        .map_err(|error| IngestError::Export {
            path: path.clone(),
            error,
        })?;
    Ok(path)
}
