//! Ranking engine, frequency analyzer, and trend analyzer, plus the
//! [`Reports`] facade that runs them against storage.

pub mod error;
pub mod frequency;
pub mod ranking;
pub mod reports;
pub mod trends;

pub use error::ReportError;
pub use frequency::FrequencyGrid;
pub use ranking::{candidate_filter, category_score, rank_posts, LEADERBOARD_SIZE};
pub use reports::Reports;
pub use trends::{trending_words, DEFAULT_TREND_LIMIT, EXCLUDED_WORDS};
