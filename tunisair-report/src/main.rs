use std::path::PathBuf;

use anyhow::Result;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::Parser;

use tunisair_report::charts::SvgChartRenderer;
use tunisair_report::config::{self, ConfigSource, ReportConfig};
use tunisair_report::render::FontBook;
use tunisair_report::store::CsvStore;
use tunisair_report::{ReportComposer, ReportResult};

/// Compose the daily flight-delay report
#[derive(Parser, Debug)]
#[command(name = "tunisair-report")]
#[command(version)]
#[command(about = "Compose the daily Tunisair flight-delay report image")]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Report day (YYYY-MM-DD), today when omitted
    #[arg(short, long)]
    date: Option<NaiveDate>,

    /// Time shown as the last update (HH:MM), now when omitted
    #[arg(long, value_parser = parse_time)]
    at: Option<NaiveTime>,

    /// Print the build result as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn parse_time(s: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(s, "%H:%M")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let (config, source) = config::read_config(&cli.config)?;

    // Initialize logging
    let _logging_guard = tunisair_report::logging::init_logging(&config.log_dir, "tunisair-report", &config.log_level)?;
    if source == ConfigSource::Defaults {
        tracing::warn!("Config file {:?} not found, using defaults", cli.config);
    }

    let now = Local::now().naive_local();
    let when = NaiveDateTime::new(
        cli.date.unwrap_or(now.date()),
        cli.at.unwrap_or(now.time()),
    );
    tracing::info!("Building daily report for {}", when.date());

    // The build is synchronous from start to finish
    let result = tokio::task::spawn_blocking(move || build_report(config, when)).await??;

    tracing::info!(
        "Report saved to {:?}: {} delayed arrivals, {} delayed departures, worst {}",
        result.path,
        result.delayed_arrivals,
        result.delayed_departures,
        result.worst_flight
    );
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    Ok(())
}

fn build_report(config: &'static ReportConfig, when: NaiveDateTime) -> Result<ReportResult> {
    let fonts = FontBook::load(&config.fonts_dir, &config.fonts)?;
    let store = CsvStore::open(&config.data_file)?;
    let charts = SvgChartRenderer::new(&store, config, fonts.database());

    let composer = ReportComposer::new(config, &store, &charts, &fonts);
    Ok(composer.build(when)?)
}
