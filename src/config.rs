use std::time::Duration;

/// Configuration for the statement client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// User agent string for HTTP requests
    pub user_agent: String,
    /// Rate limit in requests per second
    pub rate_limit: u32,
    /// HTTP request timeout
    pub timeout: Duration,
    /// Base URLs for the EDGAR services used
    pub base_urls: ClientUrls,
}

/// Base URLs for the EDGAR services used by the client
#[derive(Debug, Clone)]
pub struct ClientUrls {
    /// Base URL for EDGAR archives
    pub archives: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("statementkit/{}", crate::VERSION),
            rate_limit: 10,
            timeout: Duration::from_secs(30),
            base_urls: ClientUrls::default(),
        }
    }
}

impl ClientConfig {
    /// Creates a new ClientConfig with custom settings
    ///
    /// # Basic usage
    ///
    /// ```rust
    /// use statementkit::{ClientConfig, StatementClient};
    /// use std::time::Duration;
    ///
    /// let config = ClientConfig::new(
    ///     "YourAppName contact@example.com",
    ///     5, // requests per second
    ///     Duration::from_secs(60),
    ///     None,
    /// );
    /// let client = StatementClient::with_config(config)?;
    /// # Ok::<(), statementkit::StatementError>(())
    /// ```
    pub fn new(
        user_agent: impl Into<String>,
        rate_limit: u32,
        timeout: Duration,
        base_urls: Option<ClientUrls>,
    ) -> Self {
        Self {
            user_agent: user_agent.into(),
            rate_limit,
            timeout,
            base_urls: base_urls.unwrap_or_default(),
        }
    }
}

impl Default for ClientUrls {
    fn default() -> Self {
        Self {
            archives: "https://www.sec.gov/Archives/edgar".to_string(),
        }
    }
}
