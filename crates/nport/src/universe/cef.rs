//! Closed-end preferred and income funds covered by the export.

use crate::universe::TickerSet;
use nport_data::edgar::pad_cik;
use std::collections::{BTreeMap, HashMap};

/// Fund in the universe with its SEC registrant CIK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constituent {
    /// Fund ticker.
    pub symbol: String,
    /// Zero-padded CIK.
    pub cik: String,
}

impl Constituent {
    /// Create a new constituent.
    pub fn new(symbol: impl Into<String>, cik: &str) -> Self {
        Self {
            symbol: symbol.into(),
            cik: pad_cik(cik),
        }
    }
}

/// Default closed-end fund universe.
#[derive(Debug, Clone)]
pub struct CefUniverse {
    constituents: Vec<Constituent>,
    symbol_to_cik: HashMap<String, String>,
}

impl CefUniverse {
    /// Create the universe with its default constituents.
    pub fn new() -> Self {
        let constituents = Self::default_constituents();
        let symbol_to_cik = constituents
            .iter()
            .map(|c| (c.symbol.clone(), c.cik.clone()))
            .collect();

        Self {
            constituents,
            symbol_to_cik,
        }
    }

    /// Get all constituents.
    pub fn constituents(&self) -> &[Constituent] {
        &self.constituents
    }

    /// Get all symbols.
    pub fn symbols(&self) -> Vec<String> {
        self.constituents.iter().map(|c| c.symbol.clone()).collect()
    }

    /// Symbols as a [`TickerSet`].
    pub fn ticker_set(&self) -> TickerSet {
        TickerSet::new(self.constituents.iter().map(|c| c.symbol.as_str()))
    }

    /// Compiled-in CIK for a symbol.
    pub fn cik(&self, symbol: &str) -> Option<&str> {
        self.symbol_to_cik
            .get(&symbol.trim().to_uppercase())
            .map(String::as_str)
    }

    /// The compiled-in ticker-to-CIK table.
    pub fn static_table(&self) -> BTreeMap<String, String> {
        self.constituents
            .iter()
            .map(|c| (c.symbol.clone(), c.cik.clone()))
            .collect()
    }

    /// Get default constituents.
    ///
    /// CIKs should be checked against `company_tickers.json` whenever the fund
    /// list changes; the dynamic resolver is authoritative.
    fn default_constituents() -> Vec<Constituent> {
        vec![
            // Flaherty & Crumrine
            Constituent::new("DFP", "1571535"),
            Constituent::new("FFC", "1167015"),
            Constituent::new("FLC", "1170108"),
            Constituent::new("PFD", "850146"),
            Constituent::new("PFO", "888410"),
            // First Trust
            Constituent::new("FPF", "1570227"),
            // John Hancock
            Constituent::new("HPF", "1170284"),
            Constituent::new("HPI", "1140738"),
            Constituent::new("HPS", "1186066"),
            Constituent::new("PDT", "866415"),
            // Nuveen
            Constituent::new("JPC", "1216583"),
            Constituent::new("NPFD", "1869383"),
            // Cohen & Steers
            Constituent::new("LDP", "1579412"),
            Constituent::new("PSF", "1506298"),
            Constituent::new("PTA", "1769375"),
        ]
    }
}

impl Default for CefUniverse {
    fn default() -> Self {
        Self::new()
    }
}
