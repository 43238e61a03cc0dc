//! The atomic ingest transaction: merge a cycle's candidates and prune aged rows.

use std::collections::{HashMap, HashSet};

use bollytics_core::{merge_post, MergeOutcome, NewPost, Post};
use chrono::{Duration, Utc};
use sqlx::PgPool;

use crate::posts::{insert_post, prune_posts, update_post, PostRow, POST_COLUMNS};
use crate::DbError;

/// Advisory lock key serializing ingest batches across every process sharing
/// the database.
pub const INGEST_LOCK_KEY: i64 = 0x626f_6c6c_7974_6963;

/// Per-outcome counts for one committed ingest batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub inserted: u64,
    pub updated: u64,
    pub unchanged: u64,
    pub pruned: u64,
}

/// Merges every candidate into storage and prunes rows older than
/// `retention_days`, all inside one transaction.
///
/// The batch first takes the transaction-scoped advisory lock
/// [`INGEST_LOCK_KEY`] and waits while another batch holds it, so overlapping
/// cycles from other processes apply one after the other. Stored rows touched
/// by the batch are then locked `FOR UPDATE`.
/// Candidates are folded through [`merge_post`] in the order given, so a post
/// seen under both categories in one batch is merged twice in sequence.
/// Nothing is visible to readers until commit; any error drops the
/// transaction, which rolls it back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] for any query failure or [`DbError::CorruptRow`]
/// if a locked row cannot be mapped back to a post.
pub async fn apply_ingest_batch(
    pool: &PgPool,
    candidates: Vec<NewPost>,
    retention_days: u32,
) -> Result<IngestSummary, DbError> {
    let mut tx = pool.begin().await?;

    // Released by commit or rollback.
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(INGEST_LOCK_KEY)
        .execute(&mut *tx)
        .await?;

    let mut ids: Vec<String> = candidates.iter().map(|c| c.id.clone()).collect();
    ids.sort_unstable();
    ids.dedup();

    // Only already-stored ids can be row-locked; new ids rely on the advisory lock.
    let locked = sqlx::query_as::<_, PostRow>(&format!(
        "SELECT {POST_COLUMNS} FROM posts WHERE id = ANY($1) ORDER BY id FOR UPDATE"
    ))
    .bind(&ids)
    .fetch_all(&mut *tx)
    .await?;

    let mut current: HashMap<String, Post> = HashMap::with_capacity(ids.len());
    for row in locked {
        let post = Post::try_from(row)?;
        current.insert(post.id.clone(), post);
    }
    let existing: HashSet<String> = current.keys().cloned().collect();

    let mut summary = IngestSummary::default();
    let mut dirty: Vec<String> = Vec::new();
    let mut dirty_seen: HashSet<String> = HashSet::new();

    for candidate in candidates {
        let merged = merge_post(current.get(&candidate.id), candidate);
        match merged.outcome {
            MergeOutcome::Inserted => summary.inserted += 1,
            MergeOutcome::Updated => summary.updated += 1,
            MergeOutcome::Unchanged => {
                summary.unchanged += 1;
                continue;
            }
        }
        if dirty_seen.insert(merged.post.id.clone()) {
            dirty.push(merged.post.id.clone());
        }
        current.insert(merged.post.id.clone(), merged.post);
    }

    for id in &dirty {
        let Some(post) = current.get(id) else {
            continue;
        };
        if existing.contains(id) {
            update_post(&mut tx, post).await?;
        } else {
            insert_post(&mut tx, post).await?;
        }
    }

    let cutoff = Utc::now() - Duration::days(i64::from(retention_days));
    summary.pruned = prune_posts(&mut tx, cutoff).await?;

    tx.commit().await?;

    tracing::debug!(
        inserted = summary.inserted,
        updated = summary.updated,
        unchanged = summary.unchanged,
        pruned = summary.pruned,
        "ingest batch committed"
    );

    Ok(summary)
}
