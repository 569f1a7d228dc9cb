//! End-to-end pipeline runs against an in-memory filing source.

use flate2::Compression;
use flate2::write::GzEncoder;
use nport::data::edgar::{CompanyFilings, TickerRegistry};
use nport::data::{DataError, Result};
use nport::output::{ExportOutcome, columns};
use nport::{
    ConfigError, FilingSource, Pipeline, PipelineConfig, PipelineError, ResolverMode, SkipReason,
    SourceMode, TickerSet,
};
use rstest::rstest;
use std::collections::HashMap;
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

const WWW: &str = "https://www.sec.gov";

/// Canned responses keyed by CIK, URL or object key.
#[derive(Debug, Default)]
struct FakeSource {
    registry: Option<Vec<(&'static str, &'static str)>>,
    histories: HashMap<String, String>,
    documents: HashMap<String, String>,
    objects: Vec<(String, Vec<u8>)>,
    listing_fails: bool,
    fetched: Mutex<Vec<String>>,
}

impl FakeSource {
    fn with_registry(mut self, pairs: Vec<(&'static str, &'static str)>) -> Self {
        self.registry = Some(pairs);
        self
    }

    fn with_history(mut self, cik: &str, forms: &[&str], accessions: &[&str]) -> Self {
        let body = serde_json::json!({
            "cik": cik.trim_start_matches('0'),
            "name": "Test Fund",
            "filings": {"recent": {
                "accessionNumber": accessions,
                "form": forms,
                "filingDate": accessions.iter().map(|_| "2024-05-30").collect::<Vec<_>>(),
            }}
        });
        self.histories.insert(cik.to_string(), body.to_string());
        self
    }

    fn with_document(mut self, url: &str, xml: &str) -> Self {
        self.documents.insert(url.to_string(), xml.to_string());
        self
    }

    fn with_object(mut self, key: &str, lines: &[&str]) -> Self {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(lines.join("\n").as_bytes()).unwrap();
        self.objects.push((key.to_string(), encoder.finish().unwrap()));
        self
    }

    /// One object written as several concatenated gzip members.
    fn with_members(mut self, key: &str, members: &[&[&str]]) -> Self {
        let mut bytes = Vec::new();
        for lines in members {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(lines.join("\n").as_bytes()).unwrap();
            encoder.write_all(b"\n").unwrap();
            bytes.extend(encoder.finish().unwrap());
        }
        self.objects.push((key.to_string(), bytes));
        self
    }

    fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

impl FilingSource for FakeSource {
    async fn ticker_registry(&self) -> Result<TickerRegistry> {
        self.registry
            .clone()
            .map(TickerRegistry::from_pairs)
            .ok_or_else(|| DataError::Http("HTTP 503 for company_tickers.json".to_string()))
    }

    async fn company_filings(&self, cik: &str) -> Result<CompanyFilings> {
        let body = self
            .histories
            .get(cik)
            .ok_or_else(|| DataError::Http(format!("HTTP 404 for CIK{cik}.json")))?;
        CompanyFilings::from_json(body)
    }

    async fn filing_document(&self, url: &str) -> Result<String> {
        self.fetched.lock().unwrap().push(url.to_string());
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| DataError::Http(format!("HTTP 404 for {url}")))
    }

    async fn list_bulk_objects(&self, prefix: &str, suffix: &str) -> Result<Vec<String>> {
        if self.listing_fails {
            return Err(DataError::Http("HTTP 403 for listing".to_string()));
        }
        let mut keys: Vec<String> = self
            .objects
            .iter()
            .map(|(k, _)| k.clone())
            .filter(|k| k.starts_with(prefix) && k.ends_with(suffix))
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn bulk_object(&self, key: &str) -> Result<Vec<u8>> {
        self.objects
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| DataError::Http(format!("HTTP 404 for {key}")))
    }

    fn www_url(&self) -> &str {
        WWW
    }
}

fn holdings_xml(names: &[&str]) -> String {
    let holdings: String = names
        .iter()
        .map(|n| {
            format!(
                "<invstOrSec><name>{n}</name><lei>N/A</lei><valUSD>1000.00</valUSD></invstOrSec>"
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<edgarSubmission xmlns="http://www.sec.gov/edgar/nport">
  <headerData><submissionType>NPORT-P</submissionType></headerData>
  <formData><invstOrSecs>{holdings}</invstOrSecs></formData>
</edgarSubmission>"#
    )
}

fn per_filer_config(tickers: &str, output: &std::path::Path) -> PipelineConfig {
    PipelineConfig::new(TickerSet::parse(tickers))
        .with_output_path(output)
        .with_request_delay(Duration::ZERO)
}

const AAA_DOC: &str =
    "https://www.sec.gov/Archives/edgar/data/1/000000000124000002/primary_doc.xml";

#[tokio::test]
async fn test_per_filer_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out").join("holdings.csv");

    let source = FakeSource::default()
        .with_registry(vec![("AAA", "1")])
        .with_history(
            "0000000001",
            &["N-Q", "NPORT-P", "NPORT-P"],
            &["0000000001-24-000001", "0000000001-24-000002", "0000000001-23-000009"],
        )
        .with_document(AAA_DOC, &holdings_xml(&["Acme Pfd", "Widget 6% Notes"]));

    let pipeline = Pipeline::new(source, per_filer_config("AAA", &output)).unwrap();
    let summary = pipeline.run(None).await.unwrap();

    assert_eq!(summary.outcome, ExportOutcome::Written { path: output.clone(), rows: 2 });
    assert_eq!(summary.rows_by_ticker["AAA"], 2);
    assert!(summary.skipped.is_empty());

    let mut reader = csv::Reader::from_path(&output).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, vec!["name", "ticker", "file_source"]);

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(&rows[0][0], "Acme Pfd");
    assert_eq!(&rows[1][1], "AAA");
    assert_eq!(&rows[1][2], AAA_DOC);
}

#[tokio::test]
async fn test_latest_matching_filing_is_fetched() {
    let dir = tempfile::tempdir().unwrap();
    let source = FakeSource::default()
        .with_registry(vec![("AAA", "1")])
        .with_history(
            "0000000001",
            &["N-Q", "NPORT-P", "NPORT-P"],
            &["0000000001-24-000001", "0000000001-24-000002", "0000000001-23-000009"],
        )
        .with_document(AAA_DOC, &holdings_xml(&["Acme Pfd"]));

    let pipeline = Pipeline::new(source, per_filer_config("AAA", &dir.path().join("h.csv"))).unwrap();
    pipeline.collect(None).await.unwrap();

    assert_eq!(pipeline.source().fetched(), vec![AAA_DOC.to_string()]);
}

#[tokio::test]
async fn test_unresolved_and_missing_filings_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let source = FakeSource::default()
        .with_registry(vec![("AAA", "1"), ("BBB", "2")])
        .with_history("0000000001", &["N-Q"], &["0000000001-24-000001"])
        .with_history("0000000002", &["NPORT-P"], &["0000000002-24-000001"])
        .with_document(
            "https://www.sec.gov/Archives/edgar/data/2/000000000224000001/primary_doc.xml",
            &holdings_xml(&["Only Holding"]),
        );

    let pipeline =
        Pipeline::new(source, per_filer_config("AAA,BBB,ZZZ", &dir.path().join("h.csv"))).unwrap();
    let report = pipeline.collect(None).await.unwrap();

    assert_eq!(report.unresolved, vec!["ZZZ".to_string()]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].unit, "AAA");
    assert_eq!(report.skipped[0].reason, SkipReason::NoFiling("NPORT-P".to_string()));
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results.records()[0].ticker(), Some("BBB"));
}

#[rstest]
#[case::history(None, None, "filing history unavailable")]
#[case::document(Some(&["NPORT-P"][..]), None, "filing document unavailable")]
#[case::decode(Some(&["NPORT-P"][..]), Some("<invstOrSecs><invstOrSec>"), "could not decode filing")]
#[tokio::test]
async fn test_per_filer_failures_skip_ticker(
    #[case] forms: Option<&[&str]>,
    #[case] document: Option<&str>,
    #[case] expected: &str,
) {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("h.csv");
    let mut source = FakeSource::default().with_registry(vec![("AAA", "1")]);
    if let Some(forms) = forms {
        source = source.with_history("0000000001", forms, &["0000000001-24-000002"]);
    }
    if let Some(xml) = document {
        source = source.with_document(AAA_DOC, xml);
    }

    let pipeline = Pipeline::new(source, per_filer_config("AAA", &output)).unwrap();
    let summary = pipeline.run(None).await.unwrap();

    assert_eq!(summary.outcome, ExportOutcome::NothingExtracted);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].unit, "AAA");
    assert!(summary.skipped[0].reason.starts_with(expected));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_registry_failure_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("h.csv");
    let pipeline = Pipeline::new(FakeSource::default(), per_filer_config("AAA", &output)).unwrap();

    let err = pipeline.run(None).await.unwrap_err();
    assert!(matches!(err, PipelineError::Registry(_)));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_static_resolution_skips_registry() {
    let dir = tempfile::tempdir().unwrap();
    let source = FakeSource::default()
        .with_history("0000000001", &["NPORT-P"], &["0000000001-24-000002"])
        .with_document(AAA_DOC, &holdings_xml(&["Acme Pfd"]));
    let config = per_filer_config("AAA", &dir.path().join("h.csv"))
        .with_resolver(ResolverMode::Static)
        .with_static_ciks([("AAA", "1")]);

    let report = Pipeline::new(source, config).unwrap().collect(None).await.unwrap();
    assert_eq!(report.results.len(), 1);
}

#[test]
fn test_invalid_config_rejected() {
    let config = PipelineConfig::new(TickerSet::parse("AAA"))
        .with_resolver(ResolverMode::Static)
        .with_static_ciks([("BBB", "2")]);

    let err = Pipeline::new(FakeSource::default(), config).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Config(ConfigError::MissingStaticCik(ref missing)) if *missing == vec!["AAA".to_string()]
    ));
}

const BULK_KEY: &str = "forms/nport-p/2024q2.jsonl.gz";

fn bulk_config(tickers: &str, output: &std::path::Path) -> PipelineConfig {
    PipelineConfig::new(TickerSet::parse(tickers))
        .with_source(SourceMode::Bulk)
        .with_output_path(output)
}

#[tokio::test]
async fn test_bulk_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("bulk.csv");

    let source = FakeSource::default()
        .with_object(
            BULK_KEY,
            &[
                r#"{"ticker":"ZZZ","series":{"name":"Other","holdings":[{"name":"x"}]}}"#,
                "{not json",
                r#"{"series":{"ticker":"aaa","name":"Alpha Preferred","holdings":[{"name":"A1","valueUSD":10.5},{"name":"A2","type":"Long"}]}}"#,
            ],
        )
        .with_object("forms/nport-p/README.txt", &["ignored"]);

    let pipeline = Pipeline::new(source, bulk_config("AAA", &output)).unwrap();
    let summary = pipeline.run(None).await.unwrap();

    assert_eq!(summary.total_rows(), 2);
    assert_eq!(summary.malformed_lines, 1);

    let mut reader = csv::Reader::from_path(&output).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, columns::CANONICAL.to_vec());

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    for row in &rows {
        assert_eq!(&row[0], "AAA");
        assert_eq!(&row[1], "Alpha Preferred");
        assert_eq!(&row[10], BULK_KEY);
    }
    assert_eq!(&rows[0][5], "10.5");
    assert_eq!(&rows[1][9], "Long");
}

#[tokio::test]
async fn test_bulk_bad_object_does_not_stop_scan() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = FakeSource::default().with_object(
        "forms/nport-p/2024q3.jsonl.gz",
        &[r#"{"ticker":"AAA","series":{"holdings":[{"name":"A1"}]}}"#],
    );
    source
        .objects
        .push(("forms/nport-p/2024q1.jsonl.gz".to_string(), b"not gzip".to_vec()));

    let pipeline = Pipeline::new(source, bulk_config("AAA", &dir.path().join("b.csv"))).unwrap();
    let report = pipeline.collect(None).await.unwrap();

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].unit, "forms/nport-p/2024q1.jsonl.gz");
    assert!(matches!(report.skipped[0].reason, SkipReason::ObjectDecode(_)));
}

#[tokio::test]
async fn test_bulk_listing_failure_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("nested").join("b.csv");
    let source = FakeSource {
        listing_fails: true,
        ..FakeSource::default()
    };

    let pipeline = Pipeline::new(source, bulk_config("AAA", &output)).unwrap();
    let summary = pipeline.run(None).await.unwrap();

    assert_eq!(summary.outcome, ExportOutcome::NothingExtracted);
    assert_eq!(summary.skipped.len(), 1);
    assert!(!output.exists());
    assert!(!output.parent().unwrap().exists());
}

#[tokio::test]
async fn test_bulk_object_with_several_gzip_members() {
    let dir = tempfile::tempdir().unwrap();
    let source = FakeSource::default().with_members(
        BULK_KEY,
        &[
            &[r#"{"ticker":"AAA","series":{"holdings":[{"name":"A1"}]}}"#],
            &[
                r#"{"ticker":"ZZZ","series":{"holdings":[{"name":"Z1"}]}}"#,
                r#"{"ticker":"AAA","series":{"holdings":[{"name":"A2"},{"name":"A3"}]}}"#,
            ],
        ],
    );

    let pipeline = Pipeline::new(source, bulk_config("AAA", &dir.path().join("b.csv"))).unwrap();
    let report = pipeline.collect(None).await.unwrap();

    let names: Vec<_> = report
        .results
        .records()
        .iter()
        .map(|r| r.get(columns::HOLDING_NAME))
        .collect();
    assert_eq!(names, vec![Some("A1"), Some("A2"), Some("A3")]);
    assert!(report.skipped.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_courtesy_delay_between_filers() {
    let dir = tempfile::tempdir().unwrap();
    let source = FakeSource::default()
        .with_registry(vec![("AAA", "1"), ("BBB", "2"), ("CCC", "3")])
        .with_history("0000000001", &["NPORT-P"], &["0000000001-24-000002"])
        .with_document(AAA_DOC, &holdings_xml(&["Acme Pfd"]));
    let config = per_filer_config("AAA,BBB,CCC", &dir.path().join("h.csv"))
        .with_request_delay(Duration::from_secs(1));

    let pipeline = Pipeline::new(source, config).unwrap();
    let start = tokio::time::Instant::now();
    let report = pipeline.collect(None).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(report.results.len(), 1);
    // One pause between each pair of consecutive tickers, none before the first
    assert!(elapsed >= Duration::from_secs(2), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_secs(3), "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn test_bulk_scan_has_no_courtesy_delay() {
    let dir = tempfile::tempdir().unwrap();
    let record = r#"{"ticker":"AAA","series":{"holdings":[{"name":"A1"}]}}"#;
    let source = FakeSource::default()
        .with_object("forms/nport-p/2024q1.jsonl.gz", &[record])
        .with_object("forms/nport-p/2024q2.jsonl.gz", &[record]);
    let config =
        bulk_config("AAA", &dir.path().join("b.csv")).with_request_delay(Duration::from_secs(1));

    let pipeline = Pipeline::new(source, config).unwrap();
    let start = tokio::time::Instant::now();
    let report = pipeline.collect(None).await.unwrap();

    assert_eq!(report.results.len(), 2);
    assert!(start.elapsed() < Duration::from_millis(1));
}
