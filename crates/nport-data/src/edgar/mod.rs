//! SEC EDGAR data fetching and parsing.
//!
//! This module provides access to SEC EDGAR filings including:
//! - Ticker-to-CIK resolution from the public registry
//! - Filing history retrieval and selection of the latest N-PORT report
//! - Tabular decoding of N-PORT holdings documents
//!
//! # Example
//!
//! ```no_run
//! use nport_data::edgar::{DocumentLocator, EdgarClient, XmlTable, NPORT_DOCUMENT, NPORT_FORM};
//! use nport_data::edgar::holdings::DEFAULT_HOLDING_PATH;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EdgarClient::new()?;
//!     let registry = client.fetch_ticker_registry().await?;
//!     let cik = registry.get_cik("JPC").ok_or("JPC not in registry")?;
//!
//!     let filings = client.get_company_filings(cik).await?;
//!     let locator = DocumentLocator::new(&client.config().www_url, NPORT_DOCUMENT);
//!     if let Some(reference) = filings.locate(cik, NPORT_FORM, &locator) {
//!         let xml = client.get_filing_document(&reference.document_url).await?;
//!         let table = XmlTable::parse(&xml, DEFAULT_HOLDING_PATH)?;
//!         println!("{} positions in {}", table.len(), reference.accession_number);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod filings;
pub mod holdings;
pub mod registry;

// Re-export main types
pub use client::{EdgarClient, EdgarConfig};
pub use filings::{
    CompanyFilings, DocumentLocator, FilingHistory, FilingReference, NPORT_DOCUMENT, NPORT_FORM,
    RecentFilings,
};
pub use holdings::XmlTable;
pub use registry::{RegistryEntry, TickerRegistry, pad_cik};
