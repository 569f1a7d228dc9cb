//! Holdings export pipeline.
//!
//! One run resolves identifiers (per-filer source only), locates and decodes
//! filings, flattens them into [`HoldingRecord`]s and writes the accumulated
//! [`ResultSet`] once. Everything runs sequentially on the caller's task.
//!
//! Failures split into two kinds. [`PipelineError`] aborts the run: invalid
//! configuration, an unavailable ticker registry in dynamic mode, or a failed
//! export. Everything else becomes a [`Skip`] for the affected ticker or bulk
//! object, is logged, and the run continues.

use crate::config::{ConfigError, PipelineConfig, ResolverMode, SourceMode};
use crate::extract::{bulk_rows, table_rows};
use crate::resolver::{Resolution, resolve_dynamic, resolve_static};
use crate::source::FilingSource;
use chrono::{DateTime, Utc};
use derive_more::Display;
use indicatif::ProgressBar;
use nport_data::DataError;
use nport_data::bulk::decode_jsonl_gz;
use nport_data::edgar::{DocumentLocator, FilingReference, XmlTable};
use nport_output::export::write_results;
use nport_output::{ExportError, ExportOutcome, HoldingRecord, ResultSet, RunSummary, SkipEntry};
use thiserror::Error;

/// Fatal pipeline errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Ticker registry could not be obtained in dynamic mode
    #[error("ticker registry unavailable: {0}")]
    Registry(#[source] DataError),

    /// Export failed
    #[error("export failed: {0}")]
    Export(#[from] ExportError),
}

/// Why a ticker or bulk object contributed no rows.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum SkipReason {
    /// History holds no filing of the target form
    #[display("no {_0} filing found")]
    NoFiling(String),
    /// Submission history could not be fetched or parsed
    #[display("filing history unavailable: {_0}")]
    HistoryUnavailable(String),
    /// Filing document could not be fetched
    #[display("filing document unavailable: {_0}")]
    DocumentUnavailable(String),
    /// Filing document could not be decoded
    #[display("could not decode filing: {_0}")]
    Decode(String),
    /// Bulk listing failed
    #[display("bulk listing unavailable: {_0}")]
    ListingUnavailable(String),
    /// Bulk object could not be fetched
    #[display("bulk object unavailable: {_0}")]
    ObjectUnavailable(String),
    /// Bulk object could not be decompressed
    #[display("could not decode bulk object: {_0}")]
    ObjectDecode(String),
}

/// A skipped unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skip {
    /// Ticker, bulk object key, or listing prefix.
    pub unit: String,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// Everything collected by one run before export.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// When collection started.
    pub started_at: DateTime<Utc>,
    /// Accumulated rows.
    pub results: ResultSet,
    /// Configured tickers without an identifier.
    pub unresolved: Vec<String>,
    /// Skipped tickers or objects.
    pub skipped: Vec<Skip>,
    /// Malformed JSON lines dropped from bulk objects.
    pub malformed_lines: usize,
}

impl RunReport {
    fn new() -> Self {
        Self {
            started_at: Utc::now(),
            results: ResultSet::new(),
            unresolved: Vec::new(),
            skipped: Vec::new(),
            malformed_lines: 0,
        }
    }

    fn skip(&mut self, unit: &str, reason: SkipReason) {
        tracing::warn!(unit, %reason, "skipping");
        self.skipped.push(Skip {
            unit: unit.to_string(),
            reason,
        });
    }

    /// Summarize alongside the export outcome.
    pub fn summarize(&self, outcome: ExportOutcome) -> RunSummary {
        RunSummary::new(
            self.started_at,
            &self.results,
            self.unresolved.clone(),
            self.skipped
                .iter()
                .map(|s| SkipEntry::new(s.unit.clone(), s.reason.to_string()))
                .collect(),
            self.malformed_lines,
            outcome,
        )
    }
}

/// The configured pipeline over a [`FilingSource`].
#[derive(Debug)]
pub struct Pipeline<S> {
    source: S,
    config: PipelineConfig,
}

impl<S: FilingSource> Pipeline<S> {
    /// Create a pipeline, validating the configuration.
    ///
    /// # Errors
    /// Returns `PipelineError::Config` if the configuration is invalid.
    pub fn new(source: S, config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { source, config })
    }

    /// Configuration in use.
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Underlying filing source.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Run collection and export.
    pub async fn run(&self, progress: Option<&ProgressBar>) -> Result<RunSummary, PipelineError> {
        let report = self.collect(progress).await?;
        let outcome = self.export(&report)?;
        Ok(report.summarize(outcome))
    }

    /// Collect rows from the configured source without writing anything.
    pub async fn collect(&self, progress: Option<&ProgressBar>) -> Result<RunReport, PipelineError> {
        let mut report = RunReport::new();

        tracing::info!(
            source = %self.config.source,
            resolver = %self.config.resolver,
            tickers = %self.config.tickers,
            "starting holdings export"
        );

        match self.config.source {
            SourceMode::Bulk => self.collect_bulk(&mut report, progress).await,
            SourceMode::PerFiler => self.collect_per_filer(&mut report, progress).await?,
        }

        Ok(report)
    }

    /// Write the collected rows; an empty result set writes nothing.
    pub fn export(&self, report: &RunReport) -> Result<ExportOutcome, PipelineError> {
        let outcome = write_results(&report.results, &self.config.output_path, self.config.format)?;

        match &outcome {
            ExportOutcome::Written { path, rows } => {
                tracing::info!(rows, path = %path.display(), "export written");
            }
            ExportOutcome::NothingExtracted => {
                tracing::info!("no holdings found for the selected tickers");
            }
        }

        Ok(outcome)
    }

    /// Map configured tickers to CIKs.
    ///
    /// # Errors
    /// Returns `PipelineError::Registry` if the registry cannot be fetched in
    /// dynamic mode.
    pub async fn resolve(&self) -> Result<Resolution, PipelineError> {
        match self.config.resolver {
            ResolverMode::Static => Ok(resolve_static(&self.config.tickers, &self.config.static_ciks)),
            ResolverMode::Dynamic => {
                let registry = self
                    .source
                    .ticker_registry()
                    .await
                    .map_err(PipelineError::Registry)?;
                tracing::debug!(entries = registry.len(), "loaded ticker registry");
                Ok(resolve_dynamic(&self.config.tickers, &registry))
            }
        }
    }

    async fn collect_bulk(&self, report: &mut RunReport, progress: Option<&ProgressBar>) {
        let bulk = &self.config.bulk;

        let keys = match self.source.list_bulk_objects(&bulk.prefix, &bulk.suffix).await {
            Ok(keys) => keys,
            Err(e) => {
                report.skip(&bulk.prefix, SkipReason::ListingUnavailable(e.to_string()));
                return;
            }
        };
        tracing::info!(objects = keys.len(), "found N-PORT objects to scan");

        if let Some(pb) = progress {
            pb.set_length(keys.len() as u64);
        }

        for key in &keys {
            if let Some(pb) = progress {
                pb.set_message(key.clone());
            }

            let rows = self.scan_object(key, report).await;
            report.results.extend(rows);

            if let Some(pb) = progress {
                pb.inc(1);
            }
        }
    }

    async fn scan_object(&self, key: &str, report: &mut RunReport) -> Vec<HoldingRecord> {
        let bytes = match self.source.bulk_object(key).await {
            Ok(bytes) => bytes,
            Err(e) => {
                report.skip(key, SkipReason::ObjectUnavailable(e.to_string()));
                return Vec::new();
            }
        };

        let tickers = &self.config.tickers;
        let mut rows = Vec::new();
        let decoded = decode_jsonl_gz(&bytes, |record| {
            rows.extend(bulk_rows(&record, tickers, key));
        });
        let stats = match decoded {
            Ok(stats) => stats,
            Err(e) => {
                report.skip(key, SkipReason::ObjectDecode(e.to_string()));
                return Vec::new();
            }
        };
        report.malformed_lines += stats.malformed;

        tracing::info!(
            key,
            records = stats.records,
            malformed = stats.malformed,
            rows = rows.len(),
            "scanned object"
        );
        rows
    }

    async fn collect_per_filer(
        &self,
        report: &mut RunReport,
        progress: Option<&ProgressBar>,
    ) -> Result<(), PipelineError> {
        let resolution = self.resolve().await?;
        report.unresolved = resolution.unresolved;

        let settings = &self.config.per_filer;
        let locator = DocumentLocator::new(self.source.www_url(), settings.document_name.as_str());

        if let Some(pb) = progress {
            pb.set_length(resolution.ciks.len() as u64);
        }

        for (idx, (ticker, cik)) in resolution.ciks.iter().enumerate() {
            if idx > 0 && !settings.request_delay.is_zero() {
                tokio::time::sleep(settings.request_delay).await;
            }
            if let Some(pb) = progress {
                pb.set_message(ticker.clone());
            }

            match self.fetch_filer(ticker, cik, &locator).await {
                Ok(rows) => {
                    tracing::info!(ticker = ticker.as_str(), cik = cik.as_str(), rows = rows.len(), "extracted holdings");
                    report.results.extend(rows);
                }
                Err(reason) => report.skip(ticker, reason),
            }

            if let Some(pb) = progress {
                pb.inc(1);
            }
        }

        Ok(())
    }

    /// Locate, fetch and decode one filer's latest filing.
    async fn fetch_filer(
        &self,
        ticker: &str,
        cik: &str,
        locator: &DocumentLocator,
    ) -> Result<Vec<HoldingRecord>, SkipReason> {
        let settings = &self.config.per_filer;

        let filings = self
            .source
            .company_filings(cik)
            .await
            .map_err(|e| SkipReason::HistoryUnavailable(e.to_string()))?;

        let reference: FilingReference = filings
            .locate(cik, &settings.form_type, locator)
            .ok_or_else(|| SkipReason::NoFiling(settings.form_type.clone()))?;
        tracing::debug!(
            ticker,
            accession = %reference.accession_number,
            filed = ?reference.filing_date,
            "located filing"
        );

        let xml = self
            .source
            .filing_document(&reference.document_url)
            .await
            .map_err(|e| SkipReason::DocumentUnavailable(e.to_string()))?;

        let table = XmlTable::parse(&xml, &settings.holding_path)
            .map_err(|e| SkipReason::Decode(e.to_string()))?
            .select_columns(&settings.column_keywords);

        Ok(table_rows(&table, ticker, &reference.document_url))
    }
}
