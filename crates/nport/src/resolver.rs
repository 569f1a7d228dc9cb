//! Ticker to CIK resolution.

use crate::universe::TickerSet;
use nport_data::edgar::TickerRegistry;
use std::collections::BTreeMap;

/// Outcome of resolving the configured tickers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Ticker to zero-padded CIK, in ticker order.
    pub ciks: BTreeMap<String, String>,
    /// Configured tickers with no identifier.
    pub unresolved: Vec<String>,
}

impl Resolution {
    fn from_lookup<'a>(tickers: &TickerSet, lookup: impl Fn(&str) -> Option<&'a str>) -> Self {
        let mut resolution = Self::default();
        for ticker in tickers.iter() {
            match lookup(ticker) {
                Some(cik) => {
                    resolution.ciks.insert(ticker.to_string(), cik.to_string());
                }
                None => resolution.unresolved.push(ticker.to_string()),
            }
        }
        resolution
    }
}

/// Resolve against the live registry; unlisted tickers are dropped.
pub fn resolve_dynamic(tickers: &TickerSet, registry: &TickerRegistry) -> Resolution {
    let resolution = Resolution::from_lookup(tickers, |t| registry.get_cik(t));
    for ticker in &resolution.unresolved {
        tracing::warn!(ticker, "ticker not found in company registry, skipping");
    }
    resolution
}

/// Resolve against the compiled-in table.
pub fn resolve_static(tickers: &TickerSet, table: &BTreeMap<String, String>) -> Resolution {
    Resolution::from_lookup(tickers, |t| table.get(t).map(String::as_str))
}
