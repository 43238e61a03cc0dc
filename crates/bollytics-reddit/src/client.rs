//! HTTP client for Reddit's listing API (application-only OAuth).
//!
//! The bearer token is obtained with the client-credentials grant on first use
//! and cached. A 401 drops the cached token so the retry loop re-authenticates.

use std::time::Duration;

use bollytics_core::{AppConfig, Category, Lookback, RedditCredentials};
use reqwest::{header, Client, StatusCode, Url};
use tokio::sync::Mutex;

use crate::error::RedditError;
use crate::retry::retry_with_backoff;
use crate::types::{Listing, RawItem, TokenResponse};

const DEFAULT_API_BASE_URL: &str = "https://oauth.reddit.com/";
const DEFAULT_AUTH_BASE_URL: &str = "https://www.reddit.com/";

/// HTTP behaviour knobs for [`RedditClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientSettings {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
            backoff_base_ms: 1_000,
        }
    }
}

impl ClientSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.reddit_timeout_secs,
            max_retries: config.reddit_max_retries,
            backoff_base_ms: config.reddit_retry_backoff_base_ms,
        }
    }
}

/// Client for the Reddit listing endpoints.
///
/// Use [`RedditClient::new`] for production or [`RedditClient::with_base_urls`]
/// to point at a mock server in tests.
pub struct RedditClient {
    client: Client,
    credentials: RedditCredentials,
    settings: ClientSettings,
    api_base: Url,
    auth_base: Url,
    token: Mutex<Option<String>>,
}

impl RedditClient {
    /// Creates a client pointed at the production Reddit endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`RedditError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        credentials: RedditCredentials,
        settings: ClientSettings,
    ) -> Result<Self, RedditError> {
        Self::with_base_urls(
            credentials,
            settings,
            DEFAULT_API_BASE_URL,
            DEFAULT_AUTH_BASE_URL,
        )
    }

    /// Creates a client with custom API and token-exchange base URLs.
    ///
    /// # Errors
    ///
    /// Returns [`RedditError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`RedditError::InvalidBaseUrl`] for an unparsable URL.
    pub fn with_base_urls(
        credentials: RedditCredentials,
        settings: ClientSettings,
        api_base: &str,
        auth_base: &str,
    ) -> Result<Self, RedditError> {
        // oauth.reddit.com rejects requests without a descriptive User-Agent.
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(credentials.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            credentials,
            settings,
            api_base: parse_base_url(api_base)?,
            auth_base: parse_base_url(auth_base)?,
            token: Mutex::new(None),
        })
    }

    /// Fetches up to `limit` items from `/r/{source}/{category}` for the
    /// given lookback, retrying transient failures.
    ///
    /// # Errors
    ///
    /// - [`RedditError::Auth`] if the token exchange is refused.
    /// - [`RedditError::RateLimited`] / [`RedditError::UnexpectedStatus`] once
    ///   retries are exhausted.
    /// - [`RedditError::Deserialize`] if the listing does not match the
    ///   expected shape.
    pub async fn fetch_listing(
        &self,
        source: &str,
        category: Category,
        lookback: Lookback,
        limit: u32,
    ) -> Result<Vec<RawItem>, RedditError> {
        let items = retry_with_backoff(
            self.settings.max_retries,
            self.settings.backoff_base_ms,
            || self.fetch_listing_once(source, category, lookback, limit),
        )
        .await?;

        tracing::debug!(
            source,
            category = category.as_str(),
            lookback = lookback.as_str(),
            count = items.len(),
            "fetched Reddit listing"
        );

        Ok(items)
    }

    async fn fetch_listing_once(
        &self,
        source: &str,
        category: Category,
        lookback: Lookback,
        limit: u32,
    ) -> Result<Vec<RawItem>, RedditError> {
        let context = format!("r/{source}/{category}");
        let mut url = self
            .api_base
            .join(&context)
            .map_err(|e| RedditError::InvalidBaseUrl(format!("{context}: {e}")))?;
        url.query_pairs_mut()
            .append_pair("t", lookback.as_str())
            .append_pair("limit", &limit.to_string())
            .append_pair("raw_json", "1");

        let token = self.access_token().await?;
        let response = self.client.get(url).bearer_auth(&token).send().await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => {
                *self.token.lock().await = None;
                return Err(RedditError::Unauthorized);
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_secs = response
                    .headers()
                    .get(header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse::<u64>().ok());
                return Err(RedditError::RateLimited { retry_after_secs });
            }
            status if !status.is_success() => {
                return Err(RedditError::UnexpectedStatus {
                    status: status.as_u16(),
                    context,
                });
            }
            _ => {}
        }

        let body = response.text().await?;
        let listing: Listing =
            serde_json::from_str(&body).map_err(|e| RedditError::Deserialize {
                context,
                source: e,
            })?;

        Ok(listing.data.children.into_iter().map(|t| t.data).collect())
    }

    async fn access_token(&self) -> Result<String, RedditError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        let token = self.fetch_token().await?;
        *cached = Some(token.clone());
        Ok(token)
    }

    async fn fetch_token(&self) -> Result<String, RedditError> {
        let url = self
            .auth_base
            .join("api/v1/access_token")
            .map_err(|e| RedditError::InvalidBaseUrl(e.to_string()))?;

        let response = self
            .client
            .post(url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RedditError::Auth(format!(
                "token exchange failed with status {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| RedditError::Deserialize {
                context: "access_token".to_string(),
                source: e,
            })?;

        tracing::debug!("obtained Reddit access token");
        Ok(token.access_token)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, RedditError> {
    // A trailing slash makes `Url::join` append instead of replacing the last segment.
    let normalised = format!("{}/", raw.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| RedditError::InvalidBaseUrl(format!("{raw}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let url = parse_base_url("http://127.0.0.1:9000/reddit").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/reddit/");
        assert_eq!(
            url.join("r/kollywood/top").unwrap().as_str(),
            "http://127.0.0.1:9000/reddit/r/kollywood/top"
        );
    }

    #[test]
    fn garbage_base_url_is_rejected() {
        assert!(matches!(
            parse_base_url("not a url"),
            Err(RedditError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn settings_default_to_documented_values() {
        let settings = ClientSettings::default();
        assert_eq!(settings.timeout_secs, 30);
        assert_eq!(settings.max_retries, 3);
        assert_eq!(settings.backoff_base_ms, 1_000);
    }
}
