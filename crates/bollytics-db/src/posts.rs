//! Row mapping and single-row writes for the `posts` table.

use bollytics_core::{Category, Post};
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use crate::DbError;

pub(crate) const POST_COLUMNS: &str = "id, name, created_at, permalink, title, body, category, \
     score, upvote_ratio, num_comments, source, source_id, source_size, author, author_id, \
     dual_category, version, ingested_at, updated_at";

/// A row from the `posts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub permalink: String,
    pub title: String,
    pub body: String,
    /// `'top'` or `'controversial'`, enforced by a CHECK constraint.
    pub category: String,
    pub score: i64,
    pub upvote_ratio: f64,
    pub num_comments: i64,
    pub source: String,
    pub source_id: String,
    pub source_size: i64,
    pub author: String,
    pub author_id: String,
    pub dual_category: bool,
    pub version: i32,
    pub ingested_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PostRow> for Post {
    type Error = DbError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        let category: Category = row.category.parse().map_err(|_| DbError::CorruptRow {
            id: row.id.clone(),
            field: "category",
            value: row.category.clone(),
        })?;

        Ok(Post {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
            permalink: row.permalink,
            title: row.title,
            body: row.body,
            category,
            score: row.score,
            upvote_ratio: row.upvote_ratio,
            num_comments: row.num_comments,
            source: row.source,
            source_id: row.source_id,
            source_size: row.source_size,
            author: row.author,
            author_id: row.author_id,
            dual_category: row.dual_category,
            version: row.version,
        })
    }
}

/// Fetch one stored post by upstream id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure or [`DbError::CorruptRow`] if
/// the stored category is not recognised.
pub async fn get_post(pool: &PgPool, id: &str) -> Result<Option<Post>, DbError> {
    let row = sqlx::query_as::<_, PostRow>(&format!(
        "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(Post::try_from).transpose()
}

/// Count the posts of `source` created at or after `since`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_posts(
    pool: &PgPool,
    source: &str,
    since: DateTime<Utc>,
) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM posts WHERE source = $1 AND created_at >= $2",
    )
    .bind(source)
    .bind(since)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

pub(crate) async fn insert_post(conn: &mut PgConnection, post: &Post) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO posts \
             (id, name, created_at, permalink, title, body, category, score, upvote_ratio, \
              num_comments, source, source_id, source_size, author, author_id, \
              dual_category, version) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, \
                 $10, $11, $12, $13, $14, $15, \
                 $16, $17)",
    )
    .bind(&post.id)
    .bind(&post.name)
    .bind(post.created_at)
    .bind(&post.permalink)
    .bind(&post.title)
    .bind(&post.body)
    .bind(post.category.as_str())
    .bind(post.score)
    .bind(post.upvote_ratio)
    .bind(post.num_comments)
    .bind(&post.source)
    .bind(&post.source_id)
    .bind(post.source_size)
    .bind(&post.author)
    .bind(&post.author_id)
    .bind(post.dual_category)
    .bind(post.version)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Writes the mutable fields of an already-stored post. Identity, category,
/// and origin columns are never touched.
pub(crate) async fn update_post(conn: &mut PgConnection, post: &Post) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE posts SET \
             permalink     = $2, \
             title         = $3, \
             body          = $4, \
             score         = $5, \
             upvote_ratio  = $6, \
             num_comments  = $7, \
             dual_category = $8, \
             version       = $9, \
             updated_at    = NOW() \
         WHERE id = $1",
    )
    .bind(&post.id)
    .bind(&post.permalink)
    .bind(&post.title)
    .bind(&post.body)
    .bind(post.score)
    .bind(post.upvote_ratio)
    .bind(post.num_comments)
    .bind(post.dual_category)
    .bind(post.version)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Deletes every post created strictly before `cutoff`. Returns the number removed.
pub(crate) async fn prune_posts(
    conn: &mut PgConnection,
    cutoff: DateTime<Utc>,
) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM posts WHERE created_at < $1")
        .bind(cutoff)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}
