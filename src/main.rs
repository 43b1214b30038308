use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::Parser;
use riverflow::data::{load_bars, BarValidator, MarketScenario, SyntheticDataGenerator};
use riverflow::{IndicatorPipeline, PipelineConfig};

/// Compute pressure, river, band and correlation indicators for a bar series
#[derive(Debug, Parser)]
#[command(name = "riverflow", version)]
struct Args {
    /// JSON file holding an array of OHLCV bars
    #[arg(short, long, conflicts_with = "synthetic")]
    input: Option<PathBuf>,

    /// Generate synthetic bars instead of reading a file
    #[arg(long, value_enum)]
    synthetic: Option<MarketScenario>,

    /// Number of synthetic bars
    #[arg(long, default_value_t = 500)]
    bars: usize,

    /// Seed for synthetic bars
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Minutes between synthetic bars
    #[arg(long, default_value_t = 5)]
    interval: i64,

    /// TOML config file; RIVERFLOW__* environment variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write the JSON report (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let args = Args::parse();
    let config = PipelineConfig::load(args.config.as_deref()).context("invalid configuration")?;

    let bars = match (&args.input, args.synthetic) {
        (Some(path), _) => load_bars(path).map_err(|e| anyhow!(e))?,
        (None, Some(scenario)) => {
            tracing::info!(
                "Generating {} synthetic {:?} bars (seed {})",
                args.bars,
                scenario,
                args.seed
            );
            SyntheticDataGenerator::new(args.seed).generate(scenario, args.bars, args.interval)
        }
        (None, None) => return Err(anyhow!("either --input or --synthetic is required")),
    };

    BarValidator::new()
        .validate_series(&bars)
        .map_err(|e| anyhow!(e))
        .context("bar series rejected")?;

    let report = IndicatorPipeline::new(&config)
        .run(bars)
        .context("indicator pipeline failed")?;

    tracing::info!("  eta: {:.6}", report.eta());
    tracing::info!(
        "  ema reds/greens: {}/{}",
        report.markers.ema.reds.len(),
        report.markers.ema.greens.len()
    );
    tracing::info!(
        "  price reds/greens: {}/{}",
        report.markers.price.reds.len(),
        report.markers.price.greens.len()
    );
    tracing::info!("  blues: {}", report.markers.blues.len());

    let json = serde_json::to_string_pretty(&report)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!("Report written to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn setup_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("riverflow=info"));

    // Logs go to stderr so the JSON report can be piped
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
