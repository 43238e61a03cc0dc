//! Result types for the read-side analytics. Computed on demand, never stored.

use serde::{Deserialize, Serialize};

use crate::post::Category;

/// One leaderboard entry from the ranking engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPost {
    pub id: String,
    pub title: String,
    pub body: String,
    pub author: String,
    pub permalink: String,
    pub score: i64,
    pub upvote_ratio: f64,
    pub source: String,
    pub num_comments: i64,
    pub category: Category,
    /// Value of the leaderboard's formula, rounded to two decimals.
    pub category_score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopUser {
    pub user: String,
    pub post_count: i64,
}

/// Posts created in one (day-of-week, hour-of-day) bucket, UTC.
///
/// `day` is 0 for Sunday through 6 for Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyCell {
    pub hour: u8,
    pub day: u8,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: u64,
}
