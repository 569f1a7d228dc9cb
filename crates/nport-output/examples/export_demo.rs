//! Demonstration of exporting heterogeneous holding rows.

use nport_output::{ExportFormat, Exporter, HoldingRecord, ResultSet, columns};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== N-PORT Export Demo ===\n");

    let mut results = ResultSet::new();

    // A row decoded from a bulk JSON-lines object carries the canonical columns
    results.push(
        HoldingRecord::new()
            .with(columns::TICKER, Some("JPC".into()))
            .with(columns::FILE_SOURCE, Some("forms/nport-p/2024q4.jsonl.gz".into()))
            .with(columns::SERIES_NAME, Some("Nuveen Preferred & Income Opportunities".into()))
            .with(columns::HOLDING_NAME, Some("Bank of Somewhere 5.5% Pfd".into()))
            .with(columns::CUSIP, Some("000000AA1".into()))
            .with(columns::ISIN, None)
            .with(columns::VALUE_USD, Some("2450000.0".into()))
            .with(columns::PCT_OF_NAV, Some("1.25".into())),
    );

    // A row decoded from a primary_doc.xml only carries the filtered columns
    results.push(
        HoldingRecord::new()
            .with("name", Some("Utility Co Series B".into()))
            .with("issuerName", Some("Utility Co".into()))
            .with(columns::TICKER, Some("PFD".into()))
            .with(
                columns::FILE_SOURCE,
                Some("https://www.sec.gov/Archives/edgar/data/1/000000000124000002/primary_doc.xml".into()),
            ),
    );

    println!("Columns: {}\n", results.columns().join(", "));

    println!("CSV Format:");
    println!("{}\n", results.export_to_string(ExportFormat::Csv)?);

    println!("Pretty JSON Format:");
    println!("{}", results.export_to_string(ExportFormat::PrettyJson)?);

    Ok(())
}
