//! Export functionality for holdings result sets.
//!
//! This module writes the accumulated [`ResultSet`] once at the end of a run,
//! as CSV (the default) or JSON. Empty result sets are never written: the
//! outcome is reported as [`ExportOutcome::NothingExtracted`] instead of an
//! empty or header-only file.

use crate::record::ResultSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Comma-separated values format.
    #[default]
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Result of an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Rows were written to `path`.
    Written {
        /// Destination file.
        path: PathBuf,
        /// Number of data rows.
        rows: usize,
    },
    /// The result set was empty; no file was written.
    NothingExtracted,
}

impl ExportOutcome {
    /// Number of rows written (zero when nothing was extracted).
    pub const fn rows(&self) -> usize {
        match self {
            Self::Written { rows, .. } => *rows,
            Self::NothingExtracted => 0,
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Write data to `writer` in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    fn export_to_writer<W: Write>(&self, writer: W, format: ExportFormat)
    -> Result<(), ExportError>;

    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        let mut buf = Vec::new();
        self.export_to_writer(&mut buf, format)?;
        String::from_utf8(buf).map_err(|e| ExportError::InvalidFormat(e.to_string()))
    }

    /// Export data to a file in the specified format, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        self.export_to_writer(&mut writer, format)?;
        writer.flush()?;
        Ok(())
    }
}

impl Exporter for ResultSet {
    fn export_to_writer<W: Write>(
        &self,
        writer: W,
        format: ExportFormat,
    ) -> Result<(), ExportError> {
        match format {
            ExportFormat::Csv => {
                let columns = self.columns();
                let mut wtr = csv::Writer::from_writer(writer);
                wtr.write_record(&columns)?;
                for record in self.records() {
                    wtr.write_record(
                        columns
                            .iter()
                            .map(|column| record.get(column).unwrap_or_default()),
                    )?;
                }
                wtr.flush()?;
            }
            ExportFormat::Json => serde_json::to_writer(writer, self.records())?,
            ExportFormat::PrettyJson => serde_json::to_writer_pretty(writer, self.records())?,
        }
        Ok(())
    }
}

/// Write `results` to `path` unless empty.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot be
/// written. An empty result set is not an error.
pub fn write_results(
    results: &ResultSet,
    path: &Path,
    format: ExportFormat,
) -> Result<ExportOutcome, ExportError> {
    if results.is_empty() {
        return Ok(ExportOutcome::NothingExtracted);
    }

    results.export_to_file(path, format)?;

    Ok(ExportOutcome::Written {
        path: path.to_path_buf(),
        rows: results.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{HoldingRecord, columns};

    fn sample() -> ResultSet {
        let bulk = HoldingRecord::new()
            .with(columns::TICKER, Some("AAA".into()))
            .with(columns::FILE_SOURCE, Some("forms/nport-p/2024q1.jsonl.gz".into()))
            .with(columns::HOLDING_NAME, Some("Acme, Inc.".to_string()))
            .with(columns::VALUE_USD, Some("1500.5".to_string()))
            .with(columns::ISIN, None);
        let xml = HoldingRecord::new()
            .with("name", Some("Widget Co".to_string()))
            .with(columns::TICKER, Some("BBB".to_string()))
            .with(
                columns::FILE_SOURCE,
                Some("https://www.sec.gov/x/primary_doc.xml".to_string()),
            );

        vec![bulk, xml].into_iter().collect()
    }

    #[test]
    fn test_csv_unions_columns() {
        let csv = sample().export_to_string(ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "ticker,file_source,holding_name,valueUSD,isin,name"
        );
        assert_eq!(
            lines[1],
            "AAA,forms/nport-p/2024q1.jsonl.gz,\"Acme, Inc.\",1500.5,,"
        );
        assert_eq!(
            lines[2],
            "BBB,https://www.sec.gov/x/primary_doc.xml,,,,Widget Co"
        );
    }

    #[test]
    fn test_json_keeps_nulls() {
        let json = sample().export_to_string(ExportFormat::Json).unwrap();
        assert!(json.starts_with('['));
        assert!(json.contains("\"isin\":null"));
        assert!(json.contains("\"name\":\"Widget Co\""));
    }

    #[test]
    fn test_pretty_json() {
        let json = sample().export_to_string(ExportFormat::PrettyJson).unwrap();
        assert!(json.contains("  ")); // Indentation indicates pretty format
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("xlsx".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::PrettyJson.extension(), "json");
    }

    #[test]
    fn test_outcome_rows() {
        assert_eq!(ExportOutcome::NothingExtracted.rows(), 0);
        let written = ExportOutcome::Written {
            path: PathBuf::from("out.csv"),
            rows: 3,
        };
        assert_eq!(written.rows(), 3);
    }
}
