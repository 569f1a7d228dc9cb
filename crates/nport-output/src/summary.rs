//! End-of-run summary for console reporting.

use crate::export::ExportOutcome;
use crate::record::ResultSet;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

/// A unit of work that was skipped, with its reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipEntry {
    /// Ticker or bulk object key.
    pub unit: String,
    /// Human-readable reason.
    pub reason: String,
}

impl SkipEntry {
    /// Create a new skip entry.
    pub fn new(unit: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            reason: reason.into(),
        }
    }
}

/// What one run produced and what it skipped.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Rows per ticker.
    pub rows_by_ticker: BTreeMap<String, usize>,
    /// Configured tickers the resolver could not map.
    pub unresolved: Vec<String>,
    /// Skipped tickers or objects.
    pub skipped: Vec<SkipEntry>,
    /// Malformed JSON lines dropped from bulk objects.
    pub malformed_lines: usize,
    /// Export result.
    pub outcome: ExportOutcome,
}

impl RunSummary {
    /// Build a summary from the accumulated rows.
    pub fn new(
        started_at: DateTime<Utc>,
        results: &ResultSet,
        unresolved: Vec<String>,
        skipped: Vec<SkipEntry>,
        malformed_lines: usize,
        outcome: ExportOutcome,
    ) -> Self {
        let mut rows_by_ticker = BTreeMap::new();
        for record in results.records() {
            let ticker = record.ticker().unwrap_or("?").to_string();
            *rows_by_ticker.entry(ticker).or_insert(0) += 1;
        }

        Self {
            started_at,
            rows_by_ticker,
            unresolved,
            skipped,
            malformed_lines,
            outcome,
        }
    }

    /// Total rows across tickers.
    pub fn total_rows(&self) -> usize {
        self.rows_by_ticker.values().sum()
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "\nN-PORT Holdings Export ({})\n",
            self.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        output.push_str(&"=".repeat(60));
        output.push('\n');

        if !self.rows_by_ticker.is_empty() {
            output.push_str(&format!("{:<12} {:>10}\n", "Ticker", "Rows"));
            output.push_str(&"-".repeat(60));
            output.push('\n');
            for (ticker, rows) in &self.rows_by_ticker {
                output.push_str(&format!("{:<12} {:>10}\n", ticker, rows));
            }
            output.push_str(&"-".repeat(60));
            output.push('\n');
        }

        if !self.unresolved.is_empty() {
            output.push_str(&format!("Unresolved tickers: {}\n", self.unresolved.join(", ")));
        }

        if !self.skipped.is_empty() {
            output.push_str("\nSkipped:\n");
            for skip in &self.skipped {
                output.push_str(&format!("  {:<40} {}\n", skip.unit, skip.reason));
            }
        }

        if self.malformed_lines > 0 {
            output.push_str(&format!("Malformed lines skipped: {}\n", self.malformed_lines));
        }

        output.push_str(&"=".repeat(60));
        output.push('\n');
        output.push_str(&format!("{}\n", self));

        output
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            ExportOutcome::Written { path, rows } => {
                write!(f, "Saved {} rows to {}", rows, path.display())
            }
            ExportOutcome::NothingExtracted => {
                write!(f, "No holdings found for the selected tickers.")
            }
        }
    }
}
