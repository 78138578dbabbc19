use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::Parser;
use price_history::{
    chart::{PlotlyHtmlRenderer, default_chart_path},
    config,
    errors::PriceHistoryError,
    logging::{self, Verbosity},
    orchestrator::{CacheOrchestrator, FillReport, FillRequest},
    store::SqliteStore,
    validate,
};
use price_ingestor::providers::yahoo::YahooProvider;
use tracing::info;

/// Exit status when the run finished but at least one range failed.
const EXIT_PARTIAL: u8 = 2;

#[derive(Parser)]
#[command(
    version,
    about = "Download daily closing prices, cache them in SQLite and chart them. \
             Only business days missing from the cache are fetched from Yahoo Finance."
)]
struct Cli {
    /// Ticker symbol, e.g. AAPL or ^GSPC
    #[arg(short, long)]
    ticker: String,

    /// First day of the window (YYYY-MM-DD)
    #[arg(short = 's', long = "startdate", value_name = "YYYY-MM-DD")]
    start: String,

    /// Last day of the window, inclusive (YYYY-MM-DD)
    #[arg(short = 'e', long = "enddate", value_name = "YYYY-MM-DD")]
    end: String,

    #[arg(short, long, value_enum, ignore_case = true, default_value_t = Verbosity::Critical)]
    verbosity: Verbosity,

    /// TOML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// SQLite database, overrides the config file and DATABASE_URL
    #[arg(long, value_name = "URL")]
    database_url: Option<String>,

    /// Where to write the chart page
    #[arg(long, value_name = "FILE")]
    chart: Option<PathBuf>,

    /// Report the gaps without fetching, storing or charting anything
    #[arg(long)]
    dry_run: bool,

    /// Check the ticker's format only, without asking Yahoo about it
    #[arg(long)]
    skip_ticker_check: bool,
}

async fn run(cli: Cli) -> Result<FillReport> {
    // 1) Input
    let (start, end) = validate::parse_window(&cli.start, &cli.end)?;
    let mut cfg = config::load(cli.config.as_deref())?;
    if let Some(url) = cli.database_url {
        cfg.database.url = url;
    }

    // 2) Collaborators
    let source = YahooProvider::with_settings(cfg.source.yahoo_settings())?;
    let ticker = if cli.skip_ticker_check {
        validate::normalize_ticker(&cli.ticker)?
    } else {
        validate::validate_ticker(&source, &cli.ticker).await?
    };
    let store = SqliteStore::open(&cfg.database.url)
        .with_context(|| format!("opening database '{}'", cfg.database.url))?;
    let chart_path = cli
        .chart
        .unwrap_or_else(|| default_chart_path(&cfg.chart.output_dir, &ticker, start, end));
    info!(chart = %chart_path.display(), database = %cfg.database.url, "ready");

    // 3) Fill and display
    let request = FillRequest::new(ticker, start, end).with_dry_run(cli.dry_run);
    let mut orchestrator =
        CacheOrchestrator::new(store, source, PlotlyHtmlRenderer::new(chart_path));
    Ok(orchestrator.fill_and_display(&request).await?)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _log = logging::init(cli.verbosity);

    match run(cli).await {
        Ok(report) => {
            println!("{report}");
            if report.is_complete() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_PARTIAL)
            }
        }
        Err(e) => {
            // Ranges may have been stored before the failure; say which.
            if let Some(report) = e
                .downcast_ref::<PriceHistoryError>()
                .and_then(PriceHistoryError::partial_report)
            {
                println!("{report}");
            }
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
