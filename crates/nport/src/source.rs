//! Remote data access used by the pipeline.
//!
//! [`FilingSource`] is the seam between orchestration and the network: the
//! pipeline only ever talks to SEC EDGAR and the bulk mirror through it.

use nport_data::Result;
use nport_data::bulk::BulkClient;
use nport_data::edgar::client::EDGAR_WWW_URL;
use nport_data::edgar::{CompanyFilings, EdgarClient, EdgarConfig, TickerRegistry};

/// Remote operations the pipeline depends on.
#[allow(async_fn_in_trait)]
pub trait FilingSource {
    /// Fetch the ticker-to-CIK registry.
    async fn ticker_registry(&self) -> Result<TickerRegistry>;

    /// Fetch a filer's submission history.
    async fn company_filings(&self, cik: &str) -> Result<CompanyFilings>;

    /// Fetch a filing document as text.
    async fn filing_document(&self, url: &str) -> Result<String>;

    /// List bulk object keys under `prefix` ending in `suffix`, sorted.
    async fn list_bulk_objects(&self, prefix: &str, suffix: &str) -> Result<Vec<String>>;

    /// Fetch a bulk object's raw bytes.
    async fn bulk_object(&self, key: &str) -> Result<Vec<u8>>;

    /// Base URL that filing archive paths are composed under.
    fn www_url(&self) -> &str {
        EDGAR_WWW_URL
    }
}

/// [`FilingSource`] backed by SEC EDGAR and the public S3 mirror.
#[derive(Debug)]
pub struct EdgarSource {
    edgar: EdgarClient,
    bulk: BulkClient,
}

impl EdgarSource {
    /// Create a source sharing one configuration across both clients.
    pub fn new(config: EdgarConfig) -> Result<Self> {
        let bulk = BulkClient::new(&config)?;
        let edgar = EdgarClient::with_config(config)?;
        Ok(Self { edgar, bulk })
    }
}

impl FilingSource for EdgarSource {
    async fn ticker_registry(&self) -> Result<TickerRegistry> {
        self.edgar.fetch_ticker_registry().await
    }

    async fn company_filings(&self, cik: &str) -> Result<CompanyFilings> {
        self.edgar.get_company_filings(cik).await
    }

    async fn filing_document(&self, url: &str) -> Result<String> {
        self.edgar.get_filing_document(url).await
    }

    async fn list_bulk_objects(&self, prefix: &str, suffix: &str) -> Result<Vec<String>> {
        self.bulk.list_keys(prefix, suffix).await
    }

    async fn bulk_object(&self, key: &str) -> Result<Vec<u8>> {
        self.bulk.get_object(key).await
    }

    fn www_url(&self) -> &str {
        &self.edgar.config().www_url
    }
}
