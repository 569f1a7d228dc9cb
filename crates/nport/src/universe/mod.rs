//! Fund universe for the holdings export.
//!
//! This module provides the configured ticker set and the default closed-end
//! fund universe with its compiled-in CIK table.

pub mod cef;

pub use cef::{CefUniverse, Constituent};

use std::collections::BTreeSet;
use std::fmt;

/// Normalized, ordered set of fund tickers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickerSet {
    tickers: BTreeSet<String>,
}

impl TickerSet {
    /// Build from any symbols; they are trimmed and uppercased, blanks dropped.
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tickers = symbols
            .into_iter()
            .map(|s| s.as_ref().trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();

        Self { tickers }
    }

    /// Parse a comma- or whitespace-separated list.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(|c: char| c == ',' || c.is_whitespace()))
    }

    /// Check if a symbol is in the set (case-insensitive).
    pub fn contains(&self, symbol: &str) -> bool {
        self.tickers.contains(&symbol.trim().to_uppercase())
    }

    /// Tickers in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tickers.iter().map(String::as_str)
    }

    /// Get the number of tickers.
    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}

impl fmt::Display for TickerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.iter().collect();
        write!(f, "{}", joined.join(","))
    }
}
