use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Version assigned to a post the first time it is stored.
pub const INITIAL_VERSION: i32 = 1;

/// Author value the upstream API reports for removed accounts.
pub const DELETED_AUTHOR: &str = "[deleted]";

/// Engagement listing a post was fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Top,
    Controversial,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Top, Category::Controversial];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Top => "top",
            Category::Controversial => "controversial",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Category::Top),
            "controversial" => Ok(Category::Controversial),
            other => Err(ValidationError::UnknownCategory(other.to_string())),
        }
    }
}

/// A post as produced by the normalizer, before it has been merged with any
/// stored state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPost {
    /// Upstream item id, e.g. `"1c2x3yz"`.
    pub id: String,
    /// Fully-qualified upstream name, e.g. `"t3_1c2x3yz"`.
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub permalink: String,
    pub title: String,
    /// Self-text of the post; empty for link posts.
    pub body: String,
    pub category: Category,
    pub score: i64,
    /// Fraction of votes that were upvotes, in `[0.0, 1.0]`.
    pub upvote_ratio: f64,
    pub num_comments: i64,
    pub source: String,
    pub source_id: String,
    /// Subscriber count of the source at fetch time.
    pub source_size: i64,
    pub author: String,
    pub author_id: String,
}

/// A stored post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub permalink: String,
    pub title: String,
    pub body: String,
    /// Category the post was first stored under. Never overwritten by merges.
    pub category: Category,
    pub score: i64,
    pub upvote_ratio: f64,
    pub num_comments: i64,
    pub source: String,
    pub source_id: String,
    pub source_size: i64,
    pub author: String,
    pub author_id: String,
    /// Set once the post has been observed under both categories. Never reverts.
    pub dual_category: bool,
    pub version: i32,
}

impl Post {
    /// Builds the first stored state of a freshly ingested post.
    #[must_use]
    pub fn from_new(new: NewPost) -> Self {
        Self {
            id: new.id,
            name: new.name,
            created_at: new.created_at,
            permalink: new.permalink,
            title: new.title,
            body: new.body,
            category: new.category,
            score: new.score,
            upvote_ratio: new.upvote_ratio,
            num_comments: new.num_comments,
            source: new.source,
            source_id: new.source_id,
            source_size: new.source_size,
            author: new.author,
            author_id: new.author_id,
            dual_category: false,
            version: INITIAL_VERSION,
        }
    }

    /// `score × upvote_ratio`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn top_score(&self) -> f64 {
        self.score as f64 * self.upvote_ratio
    }

    /// `score × (1 − upvote_ratio) × num_comments`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn controversy_score(&self) -> f64 {
        self.score as f64 * (1.0 - self.upvote_ratio) * self.num_comments as f64
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::TimeZone;

    use super::*;

    pub(crate) fn new_post(id: &str, category: Category) -> NewPost {
        NewPost {
            id: id.to_string(),
            name: format!("t3_{id}"),
            created_at: Utc.with_ymd_and_hms(2026, 3, 14, 18, 30, 0).unwrap(),
            permalink: format!("/r/kollywood/comments/{id}/"),
            title: "Leo box office discussion".to_string(),
            body: String::new(),
            category,
            score: 100,
            upvote_ratio: 0.9,
            num_comments: 12,
            source: "kollywood".to_string(),
            source_id: "t5_2s8ab".to_string(),
            source_size: 250_000,
            author: "filmbuff".to_string(),
            author_id: "t2_abc".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::new_post;
    use super::*;

    #[test]
    fn category_round_trips_through_str() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn category_parse_is_case_sensitive() {
        let err = "Top".parse::<Category>().unwrap_err();
        assert_eq!(err, ValidationError::UnknownCategory("Top".to_string()));
    }

    #[test]
    fn from_new_starts_single_category_at_initial_version() {
        let post = Post::from_new(new_post("p1", Category::Controversial));
        assert!(!post.dual_category);
        assert_eq!(post.version, INITIAL_VERSION);
        assert_eq!(post.category, Category::Controversial);
    }

    #[test]
    fn top_score_is_exact_for_simple_ratio() {
        let mut post = Post::from_new(new_post("p1", Category::Top));
        post.score = 100;
        post.upvote_ratio = 0.9;
        assert!((post.top_score() - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn controversy_score_multiplies_downvote_share_by_comments() {
        let mut post = Post::from_new(new_post("p1", Category::Controversial));
        post.score = 50;
        post.upvote_ratio = 0.2;
        post.num_comments = 10;
        assert!((post.controversy_score() - 400.0).abs() < 1e-9);
    }
}
