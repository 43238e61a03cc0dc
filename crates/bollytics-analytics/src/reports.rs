//! Read-side report operations over a shared pool.

use std::sync::Arc;
use std::time::Duration;

use bollytics_core::{AppConfig, Category, RankCategory, RankedPost, Sources, TopUser, WordCount};
use bollytics_db::{
    list_post_texts, list_ranking_candidates, list_top_authors, post_frequency, with_deadline,
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::ReportError;
use crate::frequency::FrequencyGrid;
use crate::ranking::{candidate_filter, rank_posts, LEADERBOARD_SIZE};
use crate::trends::trending_words;

/// Entry point for every read report.
///
/// Cheap to clone. Each storage read is bounded by the configured read
/// deadline, and the lookback never reaches past the retention window.
#[derive(Clone)]
pub struct Reports {
    pool: PgPool,
    sources: Arc<Sources>,
    read_timeout: Duration,
    retention_days: u32,
}

impl Reports {
    #[must_use]
    pub fn new(
        pool: PgPool,
        sources: Arc<Sources>,
        read_timeout: Duration,
        retention_days: u32,
    ) -> Self {
        Self {
            pool,
            sources,
            read_timeout,
            retention_days,
        }
    }

    #[must_use]
    pub fn from_app_config(pool: PgPool, sources: Arc<Sources>, config: &AppConfig) -> Self {
        Self::new(
            pool,
            sources,
            Duration::from_secs(config.read_timeout_secs),
            config.retention_days,
        )
    }

    #[must_use]
    pub fn sources(&self) -> &Sources {
        &self.sources
    }

    /// Up to five posts of `source` ranked for `category` over the last
    /// `window_days` days.
    ///
    /// # Errors
    ///
    /// [`ReportError::Validation`] for an untracked source,
    /// [`ReportError::Storage`] for a failed or timed-out read.
    pub async fn get_top_posts(
        &self,
        source: &str,
        category: RankCategory,
        window_days: u32,
    ) -> Result<Vec<RankedPost>, ReportError> {
        let source = self.sources.resolve(source)?;
        let since = self.since(window_days);

        #[allow(clippy::cast_possible_wrap)]
        let limit = LEADERBOARD_SIZE as i64;
        let candidates = with_deadline(
            self.read_timeout,
            list_ranking_candidates(&self.pool, source, candidate_filter(category), since, limit),
        )
        .await?;

        let candidate_count = candidates.len();
        let ranked = rank_posts(candidates, category, LEADERBOARD_SIZE);
        tracing::debug!(
            source,
            category = category.as_str(),
            window_days,
            candidates = candidate_count,
            count = ranked.len(),
            "ranked top posts"
        );
        Ok(ranked)
    }

    /// Up to five authors of `source` with the most posts under `category`.
    ///
    /// # Errors
    ///
    /// [`ReportError::Validation`] for an untracked source,
    /// [`ReportError::Storage`] for a failed or timed-out read.
    pub async fn get_top_users(
        &self,
        source: &str,
        category: Category,
        window_days: u32,
    ) -> Result<Vec<TopUser>, ReportError> {
        let source = self.sources.resolve(source)?;
        let since = self.since(window_days);

        #[allow(clippy::cast_possible_wrap)]
        let limit = LEADERBOARD_SIZE as i64;
        let rows = with_deadline(
            self.read_timeout,
            list_top_authors(&self.pool, source, category, since, limit),
        )
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| TopUser {
                user: row.author,
                post_count: row.post_count,
            })
            .collect())
    }

    /// Complete 7×24 activity grid for `source`.
    ///
    /// # Errors
    ///
    /// [`ReportError::Validation`] for an untracked source,
    /// [`ReportError::Storage`] for a failed or timed-out read.
    pub async fn get_post_frequency(
        &self,
        source: &str,
        window_days: u32,
    ) -> Result<FrequencyGrid, ReportError> {
        let source = self.sources.resolve(source)?;
        let since = self.since(window_days);

        let rows = with_deadline(self.read_timeout, post_frequency(&self.pool, source, since))
            .await?;
        Ok(FrequencyGrid::from_rows(&rows))
    }

    /// The `limit` most frequent non-trivial words in `source`'s posts.
    ///
    /// # Errors
    ///
    /// [`ReportError::Validation`] for an untracked source,
    /// [`ReportError::Storage`] for a failed or timed-out read.
    pub async fn get_trending_words(
        &self,
        source: &str,
        window_days: u32,
        limit: usize,
    ) -> Result<Vec<WordCount>, ReportError> {
        let source = self.sources.resolve(source)?;
        let since = self.since(window_days);

        let texts = with_deadline(self.read_timeout, list_post_texts(&self.pool, source, since))
            .await?;
        let words = trending_words(texts.as_slice(), limit);
        tracing::debug!(
            source,
            window_days,
            texts = texts.len(),
            count = words.len(),
            "computed trending words"
        );
        Ok(words)
    }

    fn since(&self, window_days: u32) -> DateTime<Utc> {
        lookback_start(Utc::now(), window_days, self.retention_days)
    }
}

/// Start of a read window, clamped so aged-out posts that have not been
/// pruned yet are never reported.
pub(crate) fn lookback_start(
    now: DateTime<Utc>,
    window_days: u32,
    retention_days: u32,
) -> DateTime<Utc> {
    now - chrono::Duration::days(i64::from(window_days.min(retention_days)))
}

#[cfg(test)]
mod tests {
    use bollytics_core::ValidationError;
    use chrono::TimeZone;
    use sqlx::postgres::PgPoolOptions;

    use super::*;

    fn offline_reports() -> Reports {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://bollytics@localhost:1/unused")
            .expect("lazy pool");
        let sources = Sources::new(["kollywood", "bollywood"]).unwrap();
        Reports::new(pool, Arc::new(sources), Duration::from_secs(3), 365)
    }

    #[test]
    fn lookback_uses_window_when_inside_retention() {
        let now = Utc.with_ymd_and_hms(2026, 6, 30, 12, 0, 0).unwrap();
        assert_eq!(
            lookback_start(now, 7, 365),
            Utc.with_ymd_and_hms(2026, 6, 23, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn lookback_is_clamped_to_retention() {
        let now = Utc.with_ymd_and_hms(2026, 6, 30, 12, 0, 0).unwrap();
        assert_eq!(lookback_start(now, 365, 30), lookback_start(now, 30, 30));
    }

    #[tokio::test]
    async fn unknown_source_fails_before_touching_storage() {
        let reports = offline_reports();
        let err = reports
            .get_top_posts("Kollywood", RankCategory::Top, 30)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ReportError::Validation(ValidationError::UnknownSource(ref s)) if s == "Kollywood"
        ));

        let err = reports.get_post_frequency("tollywood", 30).await.unwrap_err();
        assert!(matches!(err, ReportError::Validation(_)));
    }
}
