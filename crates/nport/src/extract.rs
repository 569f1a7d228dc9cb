//! Row extraction from decoded filings.
//!
//! Bulk records map their nested holding fields onto the canonical columns.
//! Per-filer tables keep whatever columns survived the keyword filter, so
//! their rows only carry a subset of the canonical schema.

use crate::universe::TickerSet;
use nport_data::edgar::XmlTable;
use nport_output::{HoldingRecord, columns};
use serde_json::Value;

/// Ticker of a bulk record: top-level `ticker`, else `series.ticker`, uppercased.
pub fn record_ticker(record: &Value) -> Option<String> {
    [record.get("ticker"), series(record).and_then(|s| s.get("ticker"))]
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|t| !t.is_empty())
        .map(str::to_uppercase)
}

/// Rows for every holding of a bulk record whose ticker is configured.
pub fn bulk_rows(record: &Value, tickers: &TickerSet, source_key: &str) -> Vec<HoldingRecord> {
    let Some(ticker) = record_ticker(record).filter(|t| tickers.contains(t)) else {
        return Vec::new();
    };

    let series = series(record);
    let series_name = first_truthy([
        series.and_then(|s| s.get("name")),
        record.get("seriesName"),
    ]);
    let holdings = series
        .and_then(|s| s.get("holdings"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    holdings
        .iter()
        .map(|h| {
            HoldingRecord::new()
                .with(columns::TICKER, Some(ticker.clone()))
                .with(columns::SERIES_NAME, series_name.clone())
                .with(columns::HOLDING_NAME, scalar_text(h.get("name")))
                .with(columns::CUSIP, scalar_text(h.get("cusip")))
                .with(columns::ISIN, scalar_text(h.get("isin")))
                .with(columns::VALUE_USD, scalar_text(h.get("valueUSD")))
                .with(columns::PCT_OF_NAV, scalar_text(h.get("pctOfNAV")))
                .with(columns::COUNTRY, scalar_text(h.get("country")))
                .with(columns::ASSET_CATEGORY, scalar_text(h.get("assetCategory")))
                .with(
                    columns::POSITION_TYPE,
                    first_truthy([h.get("positionType"), h.get("type")]),
                )
                .with(columns::FILE_SOURCE, Some(source_key.to_string()))
        })
        .collect()
}

/// Rows for a decoded per-filer table, tagged with ticker and source URL.
pub fn table_rows(table: &XmlTable, ticker: &str, source_url: &str) -> Vec<HoldingRecord> {
    table
        .rows()
        .iter()
        .map(|row| {
            let mut record = HoldingRecord::new();
            for (column, value) in table.columns().iter().zip(row) {
                record.set(column, value.clone());
            }
            record.set(columns::TICKER, Some(ticker.to_string()));
            record.set(columns::FILE_SOURCE, Some(source_url.to_string()));
            record
        })
        .collect()
}

fn series(record: &Value) -> Option<&Value> {
    record.get("series").filter(|s| s.is_object())
}

/// Render a JSON scalar as cell text; null and missing stay null.
fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// First candidate that is present and non-empty, rendered as text.
fn first_truthy<const N: usize>(candidates: [Option<&Value>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|v| is_truthy(v))
        .and_then(|v| scalar_text(Some(v)))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const KEY: &str = "forms/nport-p/2024q1.jsonl.gz";

    #[test]
    fn test_ticker_resolution_order() {
        assert_eq!(record_ticker(&json!({"ticker": "jpc"})), Some("JPC".into()));
        assert_eq!(
            record_ticker(&json!({"ticker": "", "series": {"ticker": "pfd"}})),
            Some("PFD".into())
        );
        assert_eq!(
            record_ticker(&json!({"ticker": null, "series": {"ticker": "HPS"}})),
            Some("HPS".into())
        );
        assert_eq!(record_ticker(&json!({"series": null})), None);
        assert_eq!(record_ticker(&json!({"ticker": 42})), None);
        assert_eq!(record_ticker(&json!([1, 2])), None);
    }

    #[test]
    fn test_bulk_rows_map_canonical_fields() {
        let record = json!({
            "ticker": "JPC",
            "series": {
                "name": "Nuveen Preferred & Income Opportunities",
                "holdings": [{
                    "name": "Bank of Somewhere 5.5% Pfd",
                    "cusip": "000000AA1",
                    "isin": null,
                    "valueUSD": 2450000.5,
                    "pctOfNAV": 1.25,
                    "country": "US",
                    "assetCategory": "EP",
                    "type": "Long"
                }]
            }
        });

        let rows = bulk_rows(&record, &TickerSet::parse("JPC"), KEY);
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.columns().collect::<Vec<_>>(), columns::CANONICAL.to_vec());
        assert_eq!(row.ticker(), Some("JPC"));
        assert_eq!(row.get(columns::SERIES_NAME), Some("Nuveen Preferred & Income Opportunities"));
        assert_eq!(row.get(columns::VALUE_USD), Some("2450000.5"));
        assert_eq!(row.get(columns::PCT_OF_NAV), Some("1.25"));
        assert_eq!(row.get(columns::ISIN), None);
        assert_eq!(row.get(columns::POSITION_TYPE), Some("Long"));
        assert_eq!(row.file_source(), Some(KEY));
    }

    #[test]
    fn test_series_name_fallback() {
        let record = json!({
            "ticker": "PFD",
            "seriesName": "Flaherty Preferred Income",
            "series": {"name": "", "holdings": [{"name": "x", "positionType": "Short", "type": "Long"}]}
        });

        let rows = bulk_rows(&record, &TickerSet::parse("PFD"), KEY);
        assert_eq!(rows[0].get(columns::SERIES_NAME), Some("Flaherty Preferred Income"));
        assert_eq!(rows[0].get(columns::POSITION_TYPE), Some("Short"));
    }

    #[test]
    fn test_unconfigured_ticker_yields_nothing() {
        let record = json!({"ticker": "ZZZ", "series": {"holdings": [{"name": "x"}]}});
        assert!(bulk_rows(&record, &TickerSet::parse("AAA"), KEY).is_empty());
    }

    #[test]
    fn test_missing_holdings() {
        let record = json!({"ticker": "AAA", "series": {"holdings": "n/a"}});
        assert!(bulk_rows(&record, &TickerSet::parse("AAA"), KEY).is_empty());
        assert!(bulk_rows(&json!({"ticker": "AAA"}), &TickerSet::parse("AAA"), KEY).is_empty());
    }

    #[test]
    fn test_table_rows_append_ticker_and_source() {
        let xml = "<invstOrSecs><invstOrSec><name>A</name><valUSD>1</valUSD></invstOrSec></invstOrSecs>";
        let table = XmlTable::parse(xml, "invstOrSecs/invstOrSec")
            .unwrap()
            .select_columns(&["name"]);

        let rows = table_rows(&table, "HPS", "https://example.test/primary_doc.xml");
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].columns().collect::<Vec<_>>(),
            vec!["name", "ticker", "file_source"]
        );
        assert_eq!(rows[0].get("name"), Some("A"));
        assert!(!rows[0].has_column(columns::VALUE_USD));
    }
}
