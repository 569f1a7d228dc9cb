//! SEC EDGAR API client with rate limiting.

use crate::edgar::filings::CompanyFilings;
use crate::edgar::registry::{TickerRegistry, pad_cik};
use crate::error::{DataError, Result};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};

/// SEC EDGAR API base URL
pub const EDGAR_DATA_URL: &str = "https://data.sec.gov";

/// SEC website base URL (ticker registry and filing archives)
pub const EDGAR_WWW_URL: &str = "https://www.sec.gov";

/// Public S3 endpoint of the `sec-edgar` bucket
pub const BULK_ENDPOINT: &str = "https://sec-edgar.s3.amazonaws.com";

/// Default rate limit: 10 requests per second (SEC requirement)
pub const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(100);

/// Default HTTP timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent for SEC EDGAR requests (SEC requires identifying information)
pub const DEFAULT_USER_AGENT: &str = "nport-holdings/0.1 (contact@example.com)";

/// Endpoints and client settings shared by the EDGAR and bulk clients.
#[derive(Debug, Clone)]
pub struct EdgarConfig {
    /// `User-Agent` sent with every request
    pub user_agent: String,
    /// Base URL of `data.sec.gov`
    pub data_url: String,
    /// Base URL of `www.sec.gov`
    pub www_url: String,
    /// Endpoint of the bulk object store
    pub bulk_endpoint: String,
    /// Minimum duration between EDGAR requests
    pub min_interval: Duration,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for EdgarConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            data_url: EDGAR_DATA_URL.to_string(),
            www_url: EDGAR_WWW_URL.to_string(),
            bulk_endpoint: BULK_ENDPOINT.to_string(),
            min_interval: DEFAULT_RATE_LIMIT,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl EdgarConfig {
    /// Replace the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build a `reqwest` client carrying the configured user agent and timeout.
    pub(crate) fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(self.user_agent.as_str())
            .timeout(self.timeout)
            .build()
            .map_err(DataError::Network)
    }
}

/// Rate limiter to ensure we don't exceed SEC's rate limits
struct RateLimiter {
    last_request: Instant,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Instant::now() - min_interval,
            min_interval,
        }
    }

    async fn wait(&mut self) {
        let elapsed = self.last_request.elapsed();
        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }
        self.last_request = Instant::now();
    }
}

/// SEC EDGAR API client with rate limiting
pub struct EdgarClient {
    client: reqwest::Client,
    rate_limiter: Mutex<RateLimiter>,
    config: EdgarConfig,
}

impl EdgarClient {
    /// Create a new EDGAR client with default settings (10 req/sec)
    pub fn new() -> Result<Self> {
        Self::with_config(EdgarConfig::default())
    }

    /// Create a new EDGAR client from explicit settings
    ///
    /// # Example
    /// ```no_run
    /// use nport_data::edgar::{EdgarClient, EdgarConfig};
    /// use std::time::Duration;
    ///
    /// # fn example() -> nport_data::Result<()> {
    /// let config = EdgarConfig {
    ///     min_interval: Duration::from_millis(200),
    ///     ..EdgarConfig::default().with_user_agent("research-desk ops@example.com")
    /// };
    /// let client = EdgarClient::with_config(config)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_config(config: EdgarConfig) -> Result<Self> {
        let client = config.http_client()?;

        Ok(Self {
            client,
            rate_limiter: Mutex::new(RateLimiter::new(config.min_interval)),
            config,
        })
    }

    /// Settings this client was built with.
    pub const fn config(&self) -> &EdgarConfig {
        &self.config
    }

    /// Fetch the ticker-to-CIK registry (`company_tickers.json`).
    ///
    /// # Errors
    /// Returns `DataError::Http` on a non-success status and `DataError::Parse`
    /// if the body is not a registry document.
    pub async fn fetch_ticker_registry(&self) -> Result<TickerRegistry> {
        // Hosted at www.sec.gov, not data.sec.gov
        let url = format!("{}/files/company_tickers.json", self.config.www_url);
        let body = self.get_text(&url).await.map_err(|e| match e {
            DataError::Http(msg) => {
                DataError::Http(format!("Failed to fetch company tickers: {}", msg))
            }
            other => other,
        })?;

        TickerRegistry::from_json(&body)
    }

    /// Get company filings metadata
    ///
    /// # Arguments
    /// * `cik` - Company's CIK number (can be with or without padding)
    ///
    /// # Returns
    /// Company filings metadata including recent filings
    pub async fn get_company_filings(&self, cik: &str) -> Result<CompanyFilings> {
        if cik.is_empty() {
            return Err(DataError::InvalidSymbol("Empty CIK".to_string()));
        }

        let url = format!("{}/submissions/CIK{}.json", self.config.data_url, pad_cik(cik));
        let body = self.get_text(&url).await?;

        CompanyFilings::from_json(&body)
    }

    /// Fetch a raw filing document as text.
    pub async fn get_filing_document(&self, url: &str) -> Result<String> {
        self.get_text(url).await
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.send(url).await?;
        let content = response.text().await?;
        Ok(content)
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response> {
        self.rate_limiter.lock().await.wait().await;
        tracing::debug!(url, "GET");

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(DataError::Http(format!("{} returned HTTP {}", url, response.status())));
        }

        Ok(response)
    }
}

impl std::fmt::Debug for EdgarClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgarClient")
            .field("data_url", &self.config.data_url)
            .field("www_url", &self.config.www_url)
            .finish_non_exhaustive()
    }
}
