//! selectml offline trainer CLI
//!
//! Runs one full selection pass over a CSV dataset (or the bundled
//! diagnostic table) and persists the winning model plus the metrics
//! document.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use selectml_core::Dataset;
use selectml_trainer::{train_and_select, TrainConfig};

#[derive(Parser, Debug)]
#[command(name = "selectml-train")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train, rank, and persist binary-classification candidates", long_about = None)]
struct Args {
    /// Input CSV dataset (header row, trailing `target` column).
    /// Uses the bundled diagnostic dataset when omitted.
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Output directory for the model artifact and metrics document
    #[arg(short, long, default_value = "artifacts")]
    artifacts: PathBuf,

    /// Held-out test fraction
    #[arg(long, default_value = "0.2")]
    test_fraction: f64,

    /// Cross-validation fold count
    #[arg(long, default_value = "5")]
    folds: usize,

    /// Random seed for all shuffling
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("selectml trainer v{}", env!("CARGO_PKG_VERSION"));

    let owned;
    let dataset = match &args.data {
        Some(path) => {
            info!("Loading dataset from: {}", path.display());
            owned = Dataset::from_csv(path).context("Failed to load dataset")?;
            &owned
        }
        None => {
            info!("Using bundled diagnostic dataset");
            Dataset::builtin().context("Failed to parse bundled dataset")?
        }
    };
    info!(
        "Loaded {} samples with {} features",
        dataset.len(),
        dataset.feature_count()
    );

    let config = TrainConfig {
        test_fraction: args.test_fraction,
        folds: args.folds,
        seed: args.seed,
        ..TrainConfig::with_artifacts_dir(&args.artifacts)
    };

    let outcome = train_and_select(dataset, &config).context("Selection run failed")?;

    info!("Ranking (roc_auc desc, f1 desc):");
    for (rank, report) in outcome.reports.iter().enumerate() {
        info!(
            "  {}. {:<20} roc_auc={:.4} f1={:.4} acc={:.4} cv={:.4}±{:.4}",
            rank + 1,
            report.model,
            report.roc_auc,
            report.f1,
            report.accuracy,
            report.cv_mean_roc_auc,
            report.cv_std_roc_auc
        );
    }
    info!("Winner: {}", outcome.winner);
    info!("Model: {}", config.model_path.display());
    info!("Metrics: {}", config.metrics_path.display());

    Ok(())
}
