use governor::{
    Quota, RateLimiter, clock::DefaultClock, middleware::NoOpMiddleware, state::InMemoryState,
    state::NotKeyed,
};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use super::config::ClientConfig;
use super::error::{Result, StatementError};
use crate::parsing::summary::{LocatorConfig, ReportLocator};

const MAX_RETRIES: u32 = 5;
const INITIAL_BACKOFF_MS: u64 = 1000; // 1 second

type Governor = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

#[derive(Debug, Clone)]
pub struct StatementClient {
    /// HTTP client for making requests
    pub(crate) client: reqwest::Client,

    /// Token bucket rate limiter for SEC compliance
    pub(crate) rate_limiter: Arc<Governor>,

    /// Base URL for EDGAR archives
    pub(crate) archives_url: String,

    /// Keyword rules used to pick statement reports from a filing manifest
    pub(crate) locator: ReportLocator,
}

/// HTTP client for fetching filing summaries and rendered statement reports.
///
/// SEC.gov asks automated clients to stay under 10 requests per second. The
/// client enforces its configured rate with a token bucket shared by all clones:
///
/// ```text
/// Token Bucket (capacity: rate_limit tokens)
/// ┌──────────────────────────┐
/// │ ████████████████████████ │  ← Tokens refill at rate_limit/sec
/// └──────────────────────────┘
///      ↓ consume on request
/// ```
///
/// Rate limit responses (HTTP 429) and transport failures are retried with
/// exponential backoff and jitter; `Retry-After` is honoured when present.
///
/// # Examples
///
/// ```rust
/// # use statementkit::StatementClient;
/// let client = StatementClient::new("my_app/1.0 (my@email.com)")?;
/// # Ok::<(), statementkit::StatementError>(())
/// ```
impl StatementClient {
    /// Creates a client with the default rate limit, timeout and archive URL.
    ///
    /// The user agent identifies your application to the SEC and should carry
    /// a contact address, e.g. "AppName/Version (contact@email.com)".
    pub fn new(user_agent: &str) -> Result<Self> {
        let config = ClientConfig {
            user_agent: user_agent.to_string(),
            ..ClientConfig::default()
        };
        Self::with_config(config)
    }

    /// Creates a client with custom configuration settings.
    ///
    /// # Errors
    ///
    /// Returns `StatementError::ConfigError` if the user agent is malformed, the rate limit
    /// is zero, or the HTTP client cannot be built with the provided configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| StatementError::ConfigError(format!("Invalid user agent: {}", e)))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                StatementError::ConfigError(format!("Failed to build HTTP client: {}", e))
            })?;

        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(
            NonZeroU32::new(config.rate_limit).ok_or_else(|| {
                StatementError::ConfigError("Rate limit must be greater than zero".to_string())
            })?,
        )));

        Ok(StatementClient {
            client,
            rate_limiter,
            archives_url: config.base_urls.archives.trim_end_matches('/').to_string(),
            locator: ReportLocator::default(),
        })
    }

    /// Replaces the built-in statement keyword lists.
    pub fn with_locator(mut self, config: LocatorConfig) -> Self {
        self.locator = ReportLocator::new(config);
        self
    }

    /// Wait before retry `retry` (0-indexed): `(2^retry × 1000ms) ± 20%`.
    fn calculate_backoff(retry: u32) -> Duration {
        let backoff_ms = INITIAL_BACKOFF_MS * (2_u64.pow(retry));
        // Add some jitter (±20% of the calculated backoff)
        let jitter = (backoff_ms as f64 * 0.2 * (fastrand::f64() - 0.5)) as i64;
        Duration::from_millis((backoff_ms as i64 + jitter) as u64)
    }

    /// Fetches a document with rate limiting and retries.
    ///
    /// # Retry Behavior
    ///
    /// - **Rate limits (429)**: Retries up to 5 times, respecting `Retry-After` headers when
    ///   present, otherwise using exponential backoff
    /// - **Network errors**: Retries up to 5 times with exponential backoff
    /// - **Other HTTP errors**: No retry, returns immediately
    ///
    /// # Errors
    ///
    /// * `StatementError::NotFound` - Resource doesn't exist (HTTP 404)
    /// * `StatementError::RateLimitExceeded` - Max retries exhausted for rate limits
    /// * `StatementError::RequestError` - Network or HTTP errors
    /// * `StatementError::InvalidResponse` - Unexpected status codes with content preview
    pub async fn get(&self, url: &str) -> Result<String> {
        let mut retries = 0;

        loop {
            self.rate_limiter.until_ready().await;

            match self.client.get(url).send().await {
                Ok(response) => match response.status() {
                    reqwest::StatusCode::OK => {
                        return response.text().await.map_err(StatementError::RequestError);
                    }
                    reqwest::StatusCode::NOT_FOUND => {
                        return Err(StatementError::NotFound);
                    }
                    reqwest::StatusCode::TOO_MANY_REQUESTS => {
                        if retries >= MAX_RETRIES {
                            return Err(StatementError::RateLimitExceeded);
                        }

                        let retry_after = response
                            .headers()
                            .get("retry-after")
                            .and_then(|h| h.to_str().ok())
                            .and_then(|s| s.parse::<u64>().ok())
                            .map(Duration::from_secs)
                            .unwrap_or_else(|| Self::calculate_backoff(retries));

                        tracing::warn!(
                            "Rate limit hit (429) for {}. Attempt {}/{}. Waiting for {:?} before retry.",
                            url,
                            retries + 1,
                            MAX_RETRIES + 1,
                            retry_after
                        );
                        sleep(retry_after).await;
                        retries += 1;
                    }
                    status => {
                        let body = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Failed to read error body".to_string());

                        return Err(StatementError::InvalidResponse(format!(
                            "Unexpected status code: {} for URL: {}. Response preview: {}",
                            status,
                            url,
                            body.chars().take(200).collect::<String>()
                        )));
                    }
                },
                Err(e) => {
                    if retries >= MAX_RETRIES {
                        return Err(StatementError::RequestError(e));
                    }
                    let backoff = Self::calculate_backoff(retries);
                    tracing::warn!(
                        "Request failed for {}: {:?}. Attempt {}/{}. Retrying in {:?}.",
                        url,
                        e,
                        retries + 1,
                        MAX_RETRIES + 1,
                        backoff
                    );
                    sleep(backoff).await;
                    retries += 1;
                }
            }
        }
    }

    /// Returns the base URL for EDGAR archives.
    pub fn archives_url(&self) -> &str {
        &self.archives_url
    }
}
