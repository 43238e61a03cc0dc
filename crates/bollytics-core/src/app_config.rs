use std::net::SocketAddr;
use std::path::PathBuf;

use crate::tokens::Lookback;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Client-credentials for the upstream Reddit API.
#[derive(Clone, PartialEq, Eq)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

impl std::fmt::Debug for RedditCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedditCredentials")
            .field("client_id", &"[redacted]")
            .field("client_secret", &"[redacted]")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub sources_path: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Deadline for interactive read queries.
    pub read_timeout_secs: u64,
    /// Deadline for the whole ingest transaction.
    pub ingest_timeout_secs: u64,
    pub retention_days: u32,
    pub fetch_limit: u32,
    pub lookbacks: Vec<Lookback>,
    pub ingest_cron: String,
    pub trends_cron: String,
    pub trend_export_dir: PathBuf,
    pub trend_limit: usize,
    pub rate_limit_enabled: bool,
    pub rate_limit_rps: u32,
    pub rate_limit_burst: u32,
    pub reddit: Option<RedditCredentials>,
    pub reddit_timeout_secs: u64,
    pub reddit_max_retries: u32,
    pub reddit_retry_backoff_base_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("sources_path", &self.sources_path)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("read_timeout_secs", &self.read_timeout_secs)
            .field("ingest_timeout_secs", &self.ingest_timeout_secs)
            .field("retention_days", &self.retention_days)
            .field("fetch_limit", &self.fetch_limit)
            .field("lookbacks", &self.lookbacks)
            .field("ingest_cron", &self.ingest_cron)
            .field("trends_cron", &self.trends_cron)
            .field("trend_export_dir", &self.trend_export_dir)
            .field("trend_limit", &self.trend_limit)
            .field("rate_limit_enabled", &self.rate_limit_enabled)
            .field("rate_limit_rps", &self.rate_limit_rps)
            .field("rate_limit_burst", &self.rate_limit_burst)
            .field("reddit", &self.reddit)
            .field("reddit_timeout_secs", &self.reddit_timeout_secs)
            .field("reddit_max_retries", &self.reddit_max_retries)
            .field(
                "reddit_retry_backoff_base_ms",
                &self.reddit_retry_backoff_base_ms,
            )
            .finish()
    }
}
