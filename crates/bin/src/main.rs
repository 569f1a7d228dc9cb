//! N-PORT holdings CLI binary.
//!
//! Exports the latest N-PORT holdings of a set of closed-end funds to CSV or
//! JSON, from either the per-filer EDGAR archive or the bulk object mirror.

mod logging;

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use nport::config::DEFAULT_OUTPUT_PATH;
use nport::{
    CefUniverse, EdgarSource, Pipeline, PipelineConfig, ResolverMode, SourceMode, TickerSet,
};
use nport_data::edgar::EdgarConfig;
use nport_data::edgar::client::DEFAULT_USER_AGENT;
use nport_output::ExportFormat;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "nport-holdings")]
#[command(about = "Export closed-end fund holdings from SEC N-PORT filings", long_about = None)]
#[command(version, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch holdings and write the export (default)
    Run(RunArgs),

    /// List the configured tickers and their compiled-in CIKs
    ListTickers,
}

#[derive(Args, Clone)]
struct RunArgs {
    /// Ticker to CIK resolution strategy
    #[arg(long, env = "NPORT_RESOLVER", default_value = "dynamic")]
    resolver: ResolverMode,

    /// Holdings source
    #[arg(long, env = "NPORT_SOURCE", default_value = "per-filer")]
    source: SourceMode,

    /// Comma-separated tickers (defaults to the configured funds)
    #[arg(long, env = "NPORT_TICKERS")]
    tickers: Option<String>,

    /// Export path
    #[arg(long, env = "NPORT_OUTPUT", default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Export format (csv, json, pretty-json)
    #[arg(long, env = "NPORT_FORMAT", default_value = "csv")]
    format: ExportFormat,

    /// User-Agent sent to SEC; should identify you with a contact address
    #[arg(long, env = "NPORT_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Delay between per-filer tickers in milliseconds
    #[arg(long, env = "NPORT_DELAY_MS", default_value_t = 1000)]
    delay_ms: u64,

    /// Form type to locate in each filer's history
    #[arg(long, env = "NPORT_FORM", default_value = nport_data::edgar::NPORT_FORM)]
    form: String,

    /// Keep document columns whose name contains this keyword (repeatable)
    #[arg(long = "column-keyword", env = "NPORT_COLUMN_KEYWORDS", value_delimiter = ',')]
    column_keywords: Vec<String>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

impl RunArgs {
    fn pipeline_config(&self) -> PipelineConfig {
        let tickers = self
            .tickers
            .as_deref()
            .map_or_else(|| CefUniverse::new().ticker_set(), TickerSet::parse);

        let mut config = PipelineConfig::new(tickers)
            .with_resolver(self.resolver)
            .with_source(self.source)
            .with_output_path(self.output_path())
            .with_request_delay(Duration::from_millis(self.delay_ms));
        config.format = self.format;
        config.per_filer.form_type = self.form.clone();
        if !self.column_keywords.is_empty() {
            config.per_filer.column_keywords = self.column_keywords.clone();
        }
        config
    }

    /// The default export path follows the chosen format; explicit paths are kept.
    fn output_path(&self) -> PathBuf {
        if self.output.as_os_str() == DEFAULT_OUTPUT_PATH {
            self.output.with_extension(self.format.extension())
        } else {
            self.output.clone()
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::ListTickers) => list_tickers(),
        Some(Commands::Run(args)) => export_holdings(&args).await?,
        None => export_holdings(&cli.run).await?,
    }

    Ok(())
}

async fn export_holdings(args: &RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging(args.verbose);

    let config = args.pipeline_config();
    let source = EdgarSource::new(EdgarConfig::default().with_user_agent(args.user_agent.as_str()))?;
    let pipeline = Pipeline::new(source, config)?;

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    let summary = match pipeline.run(Some(&pb)).await {
        Ok(summary) => {
            pb.finish_and_clear();
            summary
        }
        Err(e) => {
            pb.finish_with_message("Failed!");
            return Err(e.into());
        }
    };

    println!("{}", summary.to_ascii_table());
    println!("{}", summary);

    Ok(())
}

fn list_tickers() {
    let universe = CefUniverse::new();

    println!("Configured Funds");
    println!("================\n");

    let symbols = universe.symbols();
    for symbol in &symbols {
        println!("  {:6} {}", symbol, universe.cik(symbol).unwrap_or("-"));
    }

    println!("\nTotal: {}", symbols.len());
}
