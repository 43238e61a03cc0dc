use std::str::FromStr;

use crate::app_config::{AppConfig, Environment, RedditCredentials};
use crate::tokens::Lookback;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        parse_value(var, &or_default(var, default))
    };
    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        parse_value(var, &or_default(var, default))
    };
    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        parse_value(var, &or_default(var, default))
    };
    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        parse_value(var, &or_default(var, default))
    };
    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        parse_value(var, &or_default(var, default))
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("BOLLYTICS_ENV", "development"))?;

    let bind_addr = parse("BOLLYTICS_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("BOLLYTICS_LOG_LEVEL", "info");
    let sources_path = PathBuf::from(or_default(
        "BOLLYTICS_SOURCES_PATH",
        "./config/sources.yaml",
    ));

    let db_max_connections = parse_u32("BOLLYTICS_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("BOLLYTICS_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("BOLLYTICS_DB_ACQUIRE_TIMEOUT_SECS", "10")?;
    let read_timeout_secs = parse_u64("BOLLYTICS_READ_TIMEOUT_SECS", "3")?;
    let ingest_timeout_secs = parse_u64("BOLLYTICS_INGEST_TIMEOUT_SECS", "300")?;

    let retention_days = parse_u32("BOLLYTICS_RETENTION_DAYS", "365")?;
    if retention_days == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "BOLLYTICS_RETENTION_DAYS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    // The upstream listing endpoint caps `limit` at 100.
    let fetch_limit = parse_u32("BOLLYTICS_FETCH_LIMIT", "10")?;
    if !(1..=100).contains(&fetch_limit) {
        return Err(ConfigError::InvalidEnvVar {
            var: "BOLLYTICS_FETCH_LIMIT".to_string(),
            reason: format!("{fetch_limit} is outside 1..=100"),
        });
    }

    let lookbacks = parse_lookbacks(&or_default("BOLLYTICS_LOOKBACKS", "day"))?;

    let ingest_cron = or_default("BOLLYTICS_INGEST_CRON", "0 40 23 * * *");
    let trends_cron = or_default("BOLLYTICS_TRENDS_CRON", "0 42 23 * * *");
    let trend_export_dir = PathBuf::from(or_default(
        "BOLLYTICS_TREND_EXPORT_DIR",
        "./public/wordcloud",
    ));
    let trend_limit = parse_usize("BOLLYTICS_TREND_LIMIT", "100")?;

    let rate_limit_enabled = parse_bool("BOLLYTICS_RATE_LIMIT_ENABLED", "true")?;
    let rate_limit_rps = parse_u32("BOLLYTICS_RATE_LIMIT_RPS", "10")?;
    if rate_limit_rps == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "BOLLYTICS_RATE_LIMIT_RPS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let rate_limit_burst = parse_u32("BOLLYTICS_RATE_LIMIT_BURST", "10")?;

    let reddit = match lookup("REDDIT_CLIENT_ID") {
        Ok(client_id) => Some(RedditCredentials {
            client_id,
            client_secret: require("REDDIT_CLIENT_SECRET")?,
            user_agent: require("REDDIT_USER_AGENT")?,
        }),
        Err(_) => None,
    };
    let reddit_timeout_secs = parse_u64("BOLLYTICS_REDDIT_TIMEOUT_SECS", "30")?;
    let reddit_max_retries = parse_u32("BOLLYTICS_REDDIT_MAX_RETRIES", "3")?;
    let reddit_retry_backoff_base_ms = parse_u64("BOLLYTICS_REDDIT_RETRY_BACKOFF_BASE_MS", "1000")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        sources_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        read_timeout_secs,
        ingest_timeout_secs,
        retention_days,
        fetch_limit,
        lookbacks,
        ingest_cron,
        trends_cron,
        trend_export_dir,
        trend_limit,
        rate_limit_enabled,
        rate_limit_rps,
        rate_limit_burst,
        reddit,
        reddit_timeout_secs,
        reddit_max_retries,
        reddit_retry_backoff_base_ms,
    })
}

fn parse_value<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BOLLYTICS_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

/// Parse a comma-separated lookback list, dropping duplicates but keeping order.
fn parse_lookbacks(raw: &str) -> Result<Vec<Lookback>, ConfigError> {
    let mut lookbacks = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let lookback = token
            .parse::<Lookback>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: "BOLLYTICS_LOOKBACKS".to_string(),
                reason: e.to_string(),
            })?;
        if !lookbacks.contains(&lookback) {
            lookbacks.push(lookback);
        }
    }

    if lookbacks.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "BOLLYTICS_LOOKBACKS".to_string(),
            reason: "at least one lookback is required".to_string(),
        });
    }

    Ok(lookbacks)
}
