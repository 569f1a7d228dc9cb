//! Pipeline configuration.
//!
//! A [`PipelineConfig`] is built once (by the CLI or a test) and handed to the
//! pipeline at construction time. Validation happens up front so that static
//! resolution can never come up short mid-run.

use crate::universe::{CefUniverse, TickerSet};
use derive_more::Display;
use nport_data::bulk::{BULK_PREFIX, BULK_SUFFIX};
use nport_data::edgar::holdings::{DEFAULT_COLUMN_KEYWORDS, DEFAULT_HOLDING_PATH};
use nport_data::edgar::{NPORT_DOCUMENT, NPORT_FORM, pad_cik};
use nport_output::ExportFormat;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Default export path.
pub const DEFAULT_OUTPUT_PATH: &str = "output/selected_holdings.csv";

/// Default courtesy delay between per-filer tickers.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(1);

/// Configuration errors; always fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No tickers configured
    #[error("ticker set is empty")]
    EmptyTickerSet,

    /// Static resolution requested for tickers missing from the table
    #[error("no static CIK for: {}", .0.join(", "))]
    MissingStaticCik(Vec<String>),

    /// Unknown strategy name
    #[error("unknown {kind} '{value}'")]
    UnknownMode {
        /// Which option was being parsed
        kind: &'static str,
        /// The rejected value
        value: String,
    },

    /// Empty element path for the per-filer decoder
    #[error("holding element path is empty")]
    EmptyHoldingPath,
}

/// Where filer identifiers come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum ResolverMode {
    /// Compiled-in ticker-to-CIK table.
    #[display("static")]
    Static,
    /// SEC `company_tickers.json`.
    #[default]
    #[display("dynamic")]
    Dynamic,
}

impl FromStr for ResolverMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "static" => Ok(Self::Static),
            "dynamic" => Ok(Self::Dynamic),
            other => Err(ConfigError::UnknownMode {
                kind: "resolver",
                value: other.to_string(),
            }),
        }
    }
}

/// Where holdings come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum SourceMode {
    /// Scan every bulk JSON-lines object for configured tickers.
    #[display("bulk")]
    Bulk,
    /// Fetch each filer's latest N-PORT document.
    #[default]
    #[display("per-filer")]
    PerFiler,
}

impl FromStr for SourceMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bulk" => Ok(Self::Bulk),
            "per-filer" | "per_filer" | "perfiler" => Ok(Self::PerFiler),
            other => Err(ConfigError::UnknownMode {
                kind: "source",
                value: other.to_string(),
            }),
        }
    }
}

/// Bulk scan settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkSettings {
    /// Key prefix to list.
    pub prefix: String,
    /// Key suffix of holdings-bearing objects.
    pub suffix: String,
}

impl Default for BulkSettings {
    fn default() -> Self {
        Self {
            prefix: BULK_PREFIX.to_string(),
            suffix: BULK_SUFFIX.to_string(),
        }
    }
}

/// Per-filer fetch settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerFilerSettings {
    /// Target form type.
    pub form_type: String,
    /// Document name inside the filing.
    pub document_name: String,
    /// Structural path of the repeating holding element.
    pub holding_path: String,
    /// Column keywords to keep (case-insensitive substring).
    pub column_keywords: Vec<String>,
    /// Courtesy delay between consecutive tickers.
    pub request_delay: Duration,
}

impl Default for PerFilerSettings {
    fn default() -> Self {
        Self {
            form_type: NPORT_FORM.to_string(),
            document_name: NPORT_DOCUMENT.to_string(),
            holding_path: DEFAULT_HOLDING_PATH.to_string(),
            column_keywords: DEFAULT_COLUMN_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            request_delay: DEFAULT_REQUEST_DELAY,
        }
    }
}

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Tickers to export.
    pub tickers: TickerSet,
    /// Export destination.
    pub output_path: PathBuf,
    /// Export format.
    pub format: ExportFormat,
    /// Identifier source.
    pub resolver: ResolverMode,
    /// Table used by [`ResolverMode::Static`].
    pub static_ciks: BTreeMap<String, String>,
    /// Holdings source.
    pub source: SourceMode,
    /// Bulk scan settings.
    pub bulk: BulkSettings,
    /// Per-filer fetch settings.
    pub per_filer: PerFilerSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let universe = CefUniverse::new();
        Self {
            tickers: universe.ticker_set(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            format: ExportFormat::Csv,
            resolver: ResolverMode::default(),
            static_ciks: universe.static_table(),
            source: SourceMode::default(),
            bulk: BulkSettings::default(),
            per_filer: PerFilerSettings::default(),
        }
    }
}

impl PipelineConfig {
    /// Default configuration over `tickers`.
    pub fn new(tickers: TickerSet) -> Self {
        Self {
            tickers,
            ..Self::default()
        }
    }

    /// Set the resolver mode.
    pub const fn with_resolver(mut self, resolver: ResolverMode) -> Self {
        self.resolver = resolver;
        self
    }

    /// Set the source mode.
    pub const fn with_source(mut self, source: SourceMode) -> Self {
        self.source = source;
        self
    }

    /// Set the export path.
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Replace the static table; CIKs are zero-padded and tickers uppercased.
    pub fn with_static_ciks<'a>(mut self, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        self.static_ciks = pairs
            .into_iter()
            .map(|(ticker, cik)| (ticker.trim().to_uppercase(), pad_cik(cik)))
            .collect();
        self
    }

    /// Set the courtesy delay between per-filer tickers.
    pub const fn with_request_delay(mut self, delay: Duration) -> Self {
        self.per_filer.request_delay = delay;
        self
    }

    /// Check the configuration before a run.
    ///
    /// # Errors
    /// Fails on an empty ticker set, an empty holding path, or (static
    /// resolution with the per-filer source) any ticker missing from the table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tickers.is_empty() {
            return Err(ConfigError::EmptyTickerSet);
        }

        if self.source == SourceMode::PerFiler {
            if self.per_filer.holding_path.split('/').all(str::is_empty) {
                return Err(ConfigError::EmptyHoldingPath);
            }

            if self.resolver == ResolverMode::Static {
                let missing: Vec<String> = self
                    .tickers
                    .iter()
                    .filter(|t| !self.static_ciks.contains_key(*t))
                    .map(str::to_string)
                    .collect();
                if !missing.is_empty() {
                    return Err(ConfigError::MissingStaticCik(missing));
                }
            }
        }

        Ok(())
    }
}
