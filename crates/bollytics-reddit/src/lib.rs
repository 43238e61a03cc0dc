//! Fetcher collaborator backed by Reddit's listing API, plus the normalizer
//! that turns raw listing items into [`bollytics_core::NewPost`]s.

pub mod client;
pub mod error;
pub mod normalize;
pub(crate) mod retry;
pub mod types;

use std::future::Future;

use bollytics_core::{Category, Lookback};

pub use client::{ClientSettings, RedditClient};
pub use error::RedditError;
pub use normalize::normalize_item;
pub use types::RawItem;

/// Source of raw items for one `(source, category, lookback)` combination.
///
/// Implemented by [`RedditClient`]; the ingestion orchestrator is generic over
/// it so cycles can run against an in-memory fetcher in tests.
pub trait PostFetcher: Send + Sync {
    fn fetch<'a>(
        &'a self,
        source: &'a str,
        category: Category,
        lookback: Lookback,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<RawItem>, RedditError>> + Send + 'a;
}

impl PostFetcher for RedditClient {
    fn fetch<'a>(
        &'a self,
        source: &'a str,
        category: Category,
        lookback: Lookback,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<RawItem>, RedditError>> + Send + 'a {
        self.fetch_listing(source, category, lookback, limit)
    }
}
