//! Shared domain types for the bollytics workspace.
//!
//! Everything here is free of I/O apart from configuration loading: the post
//! model, the merge rule applied on re-ingestion, the symbolic tokens the read
//! APIs accept, and the result types the analytics produce.

pub mod app_config;
pub mod config;
pub mod error;
pub mod merge;
pub mod post;
pub mod reports;
pub mod sources;
pub mod tokens;

pub use app_config::{AppConfig, Environment, RedditCredentials};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, ValidationError};
pub use merge::{merge_post, MergeOutcome, Merged};
pub use post::{Category, NewPost, Post, DELETED_AUTHOR, INITIAL_VERSION};
pub use reports::{FrequencyCell, RankedPost, TopUser, WordCount};
pub use sources::{load_sources, SourceConfig, Sources};
pub use tokens::{Lookback, RankCategory, Window};
