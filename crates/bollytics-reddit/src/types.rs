//! Wire types for Reddit listing responses.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Listing {
    pub(crate) data: ListingData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingData {
    #[serde(default)]
    pub(crate) children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Thing {
    pub(crate) data: RawItem,
}

/// One post exactly as the listing endpoint returned it.
///
/// Every field is optional on the wire; the normalizer decides which ones a
/// post cannot do without.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawItem {
    pub id: Option<String>,
    /// Fullname, e.g. `"t3_1c2x3yz"`.
    pub name: Option<String>,
    /// Seconds since the Unix epoch.
    pub created_utc: Option<f64>,
    pub permalink: Option<String>,
    pub title: Option<String>,
    pub selftext: Option<String>,
    pub score: Option<i64>,
    pub upvote_ratio: Option<f64>,
    pub num_comments: Option<i64>,
    pub subreddit: Option<String>,
    pub subreddit_id: Option<String>,
    pub subreddit_subscribers: Option<i64>,
    pub author: Option<String>,
    /// Absent for deleted accounts.
    pub author_fullname: Option<String>,
}
