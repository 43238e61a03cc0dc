//! Raw listing item → canonical [`NewPost`].

use bollytics_core::{Category, NewPost, ValidationError};
use chrono::{DateTime, Utc};

use crate::types::RawItem;

const UNKNOWN_ID: &str = "<unknown>";

/// Converts one fetched item into a [`NewPost`] tagged with the category it
/// was fetched under.
///
/// `selftext`, `subreddit_subscribers` and `author_fullname` may be absent
/// (link posts, quarantined subs, deleted accounts) and default to empty/zero.
/// Every other field is required.
///
/// # Errors
///
/// Returns [`ValidationError::MissingField`] for an absent required field, or
/// [`ValidationError::InvalidField`] for an out-of-range timestamp, ratio, or
/// comment count.
pub fn normalize_item(raw: RawItem, category: Category) -> Result<NewPost, ValidationError> {
    let id = raw.id.ok_or_else(|| ValidationError::MissingField {
        id: UNKNOWN_ID.to_string(),
        field: "id",
    })?;

    let missing = |field: &'static str| ValidationError::MissingField {
        id: id.clone(),
        field,
    };
    let invalid = |field: &'static str, reason: String| ValidationError::InvalidField {
        id: id.clone(),
        field,
        reason,
    };

    let name = raw.name.ok_or_else(|| missing("name"))?;
    let created_utc = raw.created_utc.ok_or_else(|| missing("created_utc"))?;
    let permalink = raw.permalink.ok_or_else(|| missing("permalink"))?;
    let title = raw.title.ok_or_else(|| missing("title"))?;
    let score = raw.score.ok_or_else(|| missing("score"))?;
    let upvote_ratio = raw.upvote_ratio.ok_or_else(|| missing("upvote_ratio"))?;
    let num_comments = raw.num_comments.ok_or_else(|| missing("num_comments"))?;
    let source = raw.subreddit.ok_or_else(|| missing("subreddit"))?;
    let source_id = raw.subreddit_id.ok_or_else(|| missing("subreddit_id"))?;
    let author = raw.author.ok_or_else(|| missing("author"))?;

    let created_at = epoch_to_utc(created_utc)
        .ok_or_else(|| invalid("created_utc", format!("{created_utc} is not a valid timestamp")))?;

    if !(0.0..=1.0).contains(&upvote_ratio) {
        return Err(invalid(
            "upvote_ratio",
            format!("{upvote_ratio} is outside [0, 1]"),
        ));
    }
    if num_comments < 0 {
        return Err(invalid("num_comments", format!("{num_comments} is negative")));
    }

    Ok(NewPost {
        id,
        name,
        created_at,
        permalink,
        title,
        body: raw.selftext.unwrap_or_default(),
        category,
        score,
        upvote_ratio,
        num_comments,
        source,
        source_id,
        source_size: raw.subreddit_subscribers.unwrap_or(0),
        author,
        author_id: raw.author_fullname.unwrap_or_default(),
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn epoch_to_utc(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() || secs < 0.0 || secs > f64::from(u32::MAX) * 4.0 {
        return None;
    }
    let whole = secs.trunc();
    let nanos = ((secs - whole) * 1e9).round().clamp(0.0, 999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
}
