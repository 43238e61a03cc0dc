//! Filtered read projections backing the leaderboard, frequency and trend reports.
//!
//! Every query is bounded below by a `since` timestamp computed by the caller.
//! Category filters are bound as parameters; nothing caller-supplied is ever
//! formatted into SQL text.

use bollytics_core::{Category, Post, DELETED_AUTHOR};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::posts::{PostRow, POST_COLUMNS};
use crate::DbError;

/// Which stored posts a leaderboard draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateFilter {
    /// `None` accepts either stored category.
    pub category: Option<Category>,
    pub dual_category: bool,
    pub order: CandidateOrder,
}

/// Leaderboard formula applied in SQL so only the leading rows are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateOrder {
    /// `score × upvote_ratio`, descending.
    TopScore,
    /// `score × (1 − upvote_ratio) × num_comments`, descending.
    ControversyScore,
    /// `upvote_ratio`, ascending.
    RatioAscending,
}

impl CandidateOrder {
    fn order_by(self) -> &'static str {
        match self {
            Self::TopScore => "score::float8 * upvote_ratio DESC, id ASC",
            Self::ControversyScore => {
                "score::float8 * (1.0 - upvote_ratio) * num_comments::float8 DESC, id ASC"
            }
            Self::RatioAscending => "upvote_ratio ASC, id ASC",
        }
    }
}

/// One `(author, count)` aggregate.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct TopAuthorRow {
    pub author: String,
    pub post_count: i64,
}

/// Post count for one UTC (day-of-week, hour-of-day) bucket. `day` 0 is Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct FrequencyRow {
    pub day: i32,
    pub hour: i32,
    pub post_count: i64,
}

/// Loads the leading `limit` posts of `source` created at or after `since`
/// that match `filter`, ordered by the filter's formula with ties broken by
/// ascending `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure or [`DbError::CorruptRow`] for
/// an unmappable row.
pub async fn list_ranking_candidates(
    pool: &PgPool,
    source: &str,
    filter: CandidateFilter,
    since: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<Post>, DbError> {
    let rows = sqlx::query_as::<_, PostRow>(&format!(
        "SELECT {POST_COLUMNS} FROM posts \
         WHERE source = $1 \
           AND created_at >= $2 \
           AND dual_category = $3 \
           AND ($4::text IS NULL OR category = $4) \
         ORDER BY {} \
         LIMIT $5",
        filter.order.order_by()
    ))
    .bind(source)
    .bind(since)
    .bind(filter.dual_category)
    .bind(filter.category.map(Category::as_str))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Post::try_from).collect()
}

/// Counts posts per author for a users leaderboard.
///
/// A post counts toward `category` when it was stored under it or has been
/// seen under both categories. The deleted-account sentinel is excluded.
/// Ordered by count descending, then author ascending.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_top_authors(
    pool: &PgPool,
    source: &str,
    category: Category,
    since: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<TopAuthorRow>, DbError> {
    let rows = sqlx::query_as::<_, TopAuthorRow>(
        "SELECT author, COUNT(*) AS post_count \
         FROM posts \
         WHERE source = $1 \
           AND created_at >= $2 \
           AND author <> $3 \
           AND (category = $4 OR dual_category) \
         GROUP BY author \
         ORDER BY post_count DESC, author ASC \
         LIMIT $5",
    )
    .bind(source)
    .bind(since)
    .bind(DELETED_AUTHOR)
    .bind(category.as_str())
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Groups the in-window posts of `source` by UTC day-of-week and hour-of-day.
/// Empty buckets are absent from the result.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn post_frequency(
    pool: &PgPool,
    source: &str,
    since: DateTime<Utc>,
) -> Result<Vec<FrequencyRow>, DbError> {
    let rows = sqlx::query_as::<_, FrequencyRow>(
        "SELECT EXTRACT(DOW FROM created_at AT TIME ZONE 'UTC')::int4 AS day, \
                EXTRACT(HOUR FROM created_at AT TIME ZONE 'UTC')::int4 AS hour, \
                COUNT(*) AS post_count \
         FROM posts \
         WHERE source = $1 AND created_at >= $2 \
         GROUP BY 1, 2 \
         ORDER BY 1, 2",
    )
    .bind(source)
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Title and body of every in-window post of `source`, joined by a space.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_post_texts(
    pool: &PgPool,
    source: &str,
    since: DateTime<Utc>,
) -> Result<Vec<String>, DbError> {
    let texts = sqlx::query_scalar::<_, String>(
        "SELECT CASE WHEN body = '' THEN title ELSE title || ' ' || body END \
         FROM posts \
         WHERE source = $1 AND created_at >= $2 \
         ORDER BY id",
    )
    .bind(source)
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(texts)
}
