//! Ticker-to-CIK registry published by the SEC.
//!
//! CIK (Central Index Key) is a unique identifier assigned by the SEC to
//! every registrant filing with EDGAR.

use crate::error::{DataError, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// Pad CIK to 10 digits as required by SEC.
///
/// # Example
/// ```
/// # use nport_data::edgar::pad_cik;
/// assert_eq!(pad_cik("320193"), "0000320193");
/// ```
pub fn pad_cik(cik: &str) -> String {
    format!("{:0>10}", cik.trim())
}

/// The registry publishes `cik_str` as an integer despite the name; some mirrors
/// quote it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CikValue {
    Number(u64),
    Text(String),
}

impl CikValue {
    fn into_padded(self) -> Option<String> {
        match self {
            Self::Number(n) => Some(pad_cik(&n.to_string())),
            Self::Text(s) if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) => {
                Some(pad_cik(&s))
            }
            Self::Text(_) => None,
        }
    }
}

/// Raw company ticker data from SEC JSON.
/// The SEC returns: {"0": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."}, ...}
#[derive(Debug, Deserialize)]
struct CompanyTicker {
    cik_str: CikValue,
    ticker: String,
    #[serde(default)]
    title: String,
}

/// A single registrant in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    /// Zero-padded 10 digit CIK
    pub cik: String,
    /// Registrant name
    pub title: String,
}

/// Lookup table for converting ticker symbols to CIK numbers.
#[derive(Debug, Clone, Default)]
pub struct TickerRegistry {
    /// Map from uppercase ticker to entry
    ticker_to_cik: HashMap<String, RegistryEntry>,
}

impl TickerRegistry {
    /// Parse the `company_tickers.json` document.
    ///
    /// Entries with an unusable CIK are skipped. When a ticker appears more than
    /// once, the entry with the lowest registry index wins.
    pub fn from_json(json: &str) -> Result<Self> {
        let data: HashMap<String, CompanyTicker> = serde_json::from_str(json)
            .map_err(|e| DataError::Parse(format!("Failed to parse company tickers: {}", e)))?;

        let mut indexed: Vec<(u64, CompanyTicker)> = data
            .into_iter()
            .map(|(idx, company)| (idx.parse().unwrap_or(u64::MAX), company))
            .collect();
        indexed.sort_by_key(|(idx, _)| *idx);

        let mut ticker_to_cik = HashMap::new();
        for (_idx, company) in indexed {
            let ticker = company.ticker.trim().to_uppercase();
            if ticker.is_empty() {
                continue;
            }
            let Some(cik) = company.cik_str.into_padded() else {
                continue;
            };
            ticker_to_cik.entry(ticker).or_insert(RegistryEntry {
                cik,
                title: company.title,
            });
        }

        Ok(Self { ticker_to_cik })
    }

    /// Build a registry from `(ticker, cik)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let ticker_to_cik = pairs
            .into_iter()
            .map(|(ticker, cik)| {
                (
                    ticker.to_uppercase(),
                    RegistryEntry {
                        cik: pad_cik(cik),
                        title: String::new(),
                    },
                )
            })
            .collect();

        Self { ticker_to_cik }
    }

    /// Look up CIK by ticker symbol (case-insensitive).
    pub fn get_cik(&self, ticker: &str) -> Option<&str> {
        self.get(ticker).map(|entry| entry.cik.as_str())
    }

    /// Look up the full entry by ticker symbol (case-insensitive).
    pub fn get(&self, ticker: &str) -> Option<&RegistryEntry> {
        self.ticker_to_cik.get(&ticker.trim().to_uppercase())
    }

    /// Number of tickers in the registry.
    pub fn len(&self) -> usize {
        self.ticker_to_cik.len()
    }

    /// Whether the registry holds no tickers.
    pub fn is_empty(&self) -> bool {
        self.ticker_to_cik.is_empty()
    }
}
