//! Holding rows and the run's accumulated result set.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashSet;

/// Canonical column names.
pub mod columns {
    /// Fund ticker that selected the row.
    pub const TICKER: &str = "ticker";
    /// Series (fund) name.
    pub const SERIES_NAME: &str = "seriesName";
    /// Name of the held security or issuer.
    pub const HOLDING_NAME: &str = "holding_name";
    /// CUSIP code.
    pub const CUSIP: &str = "cusip";
    /// ISIN code.
    pub const ISIN: &str = "isin";
    /// Position value in USD.
    pub const VALUE_USD: &str = "valueUSD";
    /// Position value as percent of net assets.
    pub const PCT_OF_NAV: &str = "pctOfNAV";
    /// Country of the issuer.
    pub const COUNTRY: &str = "country";
    /// Asset category code.
    pub const ASSET_CATEGORY: &str = "assetCategory";
    /// Long/short position type.
    pub const POSITION_TYPE: &str = "positionType";
    /// Bulk object key or filing document URL the row came from.
    pub const FILE_SOURCE: &str = "file_source";

    /// All canonical columns in export order.
    pub const CANONICAL: [&str; 11] = [
        TICKER,
        SERIES_NAME,
        HOLDING_NAME,
        CUSIP,
        ISIN,
        VALUE_USD,
        PCT_OF_NAV,
        COUNTRY,
        ASSET_CATEGORY,
        POSITION_TYPE,
        FILE_SOURCE,
    ];
}

/// One exported holding row.
///
/// An ordered mapping from column name to a nullable text value. Setting an
/// existing column replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HoldingRecord {
    fields: Vec<(String, Option<String>)>,
}

impl HoldingRecord {
    /// Create an empty record.
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Set a column, keeping its position if already present.
    pub fn set(&mut self, column: &str, value: Option<String>) {
        match self.fields.iter_mut().find(|(name, _)| name == column) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((column.to_string(), value)),
        }
    }

    /// Builder form of [`HoldingRecord::set`].
    pub fn with(mut self, column: &str, value: Option<String>) -> Self {
        self.set(column, value);
        self
    }

    /// Value of a column; `None` if absent or null.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .and_then(|(_, value)| value.as_deref())
    }

    /// Whether the column exists (even if null).
    pub fn has_column(&self, column: &str) -> bool {
        self.fields.iter().any(|(name, _)| name == column)
    }

    /// Column names in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Ticker that selected this row.
    pub fn ticker(&self) -> Option<&str> {
        self.get(columns::TICKER)
    }

    /// Provenance of this row.
    pub fn file_source(&self) -> Option<&str> {
        self.get(columns::FILE_SOURCE)
    }
}

impl Serialize for HoldingRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Append-only rows accumulated over one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    records: Vec<HoldingRecord>,
}

impl ResultSet {
    /// Create an empty result set.
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Append one record.
    pub fn push(&mut self, record: HoldingRecord) {
        self.records.push(record);
    }

    /// Union of all record columns in first-seen order.
    pub fn columns(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for column in self.records.iter().flat_map(HoldingRecord::columns) {
            if seen.insert(column) {
                out.push(column.to_string());
            }
        }
        out
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[HoldingRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record has been accumulated.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Extend<HoldingRecord> for ResultSet {
    fn extend<I: IntoIterator<Item = HoldingRecord>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}

impl FromIterator<HoldingRecord> for ResultSet {
    fn from_iter<I: IntoIterator<Item = HoldingRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
