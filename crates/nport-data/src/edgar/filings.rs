//! SEC EDGAR filing history and filing location.
//!
//! This module provides functionality to:
//! - Parse a filer's submission history from the submissions API
//! - Select the most recent filing of a given form type
//! - Compose the archive URL of that filing's document

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use serde::Deserialize;

/// Form type of the public N-PORT holdings report.
pub const NPORT_FORM: &str = "NPORT-P";

/// Document name of the structured N-PORT filing.
pub const NPORT_DOCUMENT: &str = "primary_doc.xml";

/// Company filings data from SEC EDGAR submissions API.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyFilings {
    /// Central Index Key
    #[serde(default)]
    pub cik: String,
    /// Company name
    #[serde(default)]
    pub name: String,
    /// Filing history
    pub filings: FilingHistory,
}

/// Container for filing history data.
#[derive(Debug, Clone, Deserialize)]
pub struct FilingHistory {
    /// Recent filings
    pub recent: RecentFilings,
}

/// Recent filings data.
///
/// The SEC API returns filing information as parallel arrays where
/// each index corresponds to a single filing, most recent first.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentFilings {
    /// Accession numbers (unique filing identifiers)
    pub accession_number: Vec<String>,
    /// Form types (e.g., "NPORT-P", "N-CSR")
    pub form: Vec<String>,
    /// Filing dates in YYYY-MM-DD format
    #[serde(default)]
    pub filing_date: Vec<String>,
}

/// Location of a single filing document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilingReference {
    /// Zero-padded CIK of the filer
    pub cik: String,
    /// Accession number as published (with dashes)
    pub accession_number: String,
    /// Form type
    pub form: String,
    /// Filing date, when the history carries one
    pub filing_date: Option<NaiveDate>,
    /// Full URL of the document
    pub document_url: String,
}

/// Composes archive URLs for filing documents.
#[derive(Debug, Clone)]
pub struct DocumentLocator {
    archive_base: String,
    document_name: String,
}

impl DocumentLocator {
    /// Locator rooted at `{www_url}/Archives/edgar/data` for `document_name`.
    pub fn new(www_url: &str, document_name: impl Into<String>) -> Self {
        Self {
            archive_base: format!("{}/Archives/edgar/data", www_url.trim_end_matches('/')),
            document_name: document_name.into(),
        }
    }

    /// Get the URL of the document inside a filing.
    ///
    /// # Example
    /// ```
    /// # use nport_data::edgar::DocumentLocator;
    /// let locator = DocumentLocator::new("https://www.sec.gov", "primary_doc.xml");
    /// let url = locator.document_url("0001216583", "0001216583-24-000012");
    /// assert_eq!(
    ///     url,
    ///     "https://www.sec.gov/Archives/edgar/data/1216583/000121658324000012/primary_doc.xml"
    /// );
    /// ```
    pub fn document_url(&self, cik: &str, accession: &str) -> String {
        // Archive paths use the unpadded CIK
        let trimmed = cik.trim_start_matches('0');
        let cik_path = if trimmed.is_empty() { "0" } else { trimmed };
        let accession_no_dashes = accession.replace('-', "");

        format!(
            "{}/{}/{}/{}",
            self.archive_base, cik_path, accession_no_dashes, self.document_name
        )
    }
}

impl CompanyFilings {
    /// Parse a submissions API document.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| DataError::Parse(format!("Failed to parse company filings: {}", e)))
    }

    /// Index of the most recent filing of `form_type`.
    ///
    /// The history is already ordered most recent first, so the first exact
    /// match wins. Indices beyond the shorter of the two arrays are ignored.
    pub fn latest_index(&self, form_type: &str) -> Option<usize> {
        let recent = &self.filings.recent;

        recent
            .form
            .iter()
            .zip(&recent.accession_number)
            .position(|(form, _)| form == form_type)
    }

    /// Locate the most recent filing of `form_type` for `cik`.
    ///
    /// # Returns
    /// `None` if the history holds no filing of that type
    pub fn locate(
        &self,
        cik: &str,
        form_type: &str,
        locator: &DocumentLocator,
    ) -> Option<FilingReference> {
        let idx = self.latest_index(form_type)?;
        let recent = &self.filings.recent;
        let accession_number = recent.accession_number[idx].clone();

        let filing_date = recent
            .filing_date
            .get(idx)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());

        Some(FilingReference {
            cik: cik.to_string(),
            document_url: locator.document_url(cik, &accession_number),
            accession_number,
            form: recent.form[idx].clone(),
            filing_date,
        })
    }
}
