//! CLI entry point for the triathlon rater.
//!
//! Provides subcommands for ranking a results CSV, validating one without
//! ranking, and printing the effective segment weights.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use tri_rater::{
    Segment, SegmentWeights,
    loader::load_table,
    output::{RankReport, write_json, write_rankings_csv, write_table},
    rank,
    record::parse_rows,
};

#[derive(Parser)]
#[command(name = "tri_rater")]
#[command(about = "Rank triathlon results by weighted segment times", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank the athletes in a results CSV
    Rank {
        /// Results CSV (identifier column plus the five segment columns)
        #[arg(value_name = "CSV")]
        input: PathBuf,

        #[command(flatten)]
        weights: WeightArgs,

        /// Also write the rankings to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Gzip compress the rankings CSV
        #[arg(long, default_value_t = false, requires = "output")]
        gzip: bool,

        /// Print a JSON report instead of the table
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Check a results CSV and list the rows that would be rejected
    Validate {
        #[arg(value_name = "CSV")]
        input: PathBuf,
    },
    /// Print the effective weights as JSON
    Weights {
        #[command(flatten)]
        weights: WeightArgs,
    },
}

#[derive(Args)]
struct WeightArgs {
    /// JSON weights file (defaults to $TRI_RATER_WEIGHTS when set)
    #[arg(short, long, value_name = "FILE")]
    weights: Option<PathBuf>,

    /// Swimming weight
    #[arg(long)]
    swimming: Option<f64>,

    /// Cycling weight
    #[arg(long)]
    cycling: Option<f64>,

    /// Running weight
    #[arg(long)]
    running: Option<f64>,

    /// First transition weight
    #[arg(long)]
    transition1: Option<f64>,

    /// Second transition weight
    #[arg(long)]
    transition2: Option<f64>,
}

impl WeightArgs {
    fn resolve(&self) -> Result<SegmentWeights> {
        self.resolve_with(std::env::var_os("TRI_RATER_WEIGHTS").map(PathBuf::from))
    }

    /// Defaults, then the weights file (`--weights`, else `env_file`), then
    /// per-segment flags.
    fn resolve_with(&self, env_file: Option<PathBuf>) -> Result<SegmentWeights> {
        let file = self.weights.clone().or(env_file);

        let mut weights = match &file {
            Some(path) => SegmentWeights::load(path)
                .with_context(|| format!("loading weights from {}", path.display()))?,
            None => SegmentWeights::default(),
        };

        let flags = [
            (Segment::Swimming, self.swimming),
            (Segment::Cycling, self.cycling),
            (Segment::Running, self.running),
            (Segment::Transition1, self.transition1),
            (Segment::Transition2, self.transition2),
        ];
        for (segment, value) in flags {
            if let Some(v) = value {
                weights = weights.with(segment, v)?;
            }
        }

        Ok(weights)
    }
}

fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok(); // Load .env file

    let _file_guard = init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Rank {
            input,
            weights,
            output,
            gzip,
            json,
        } => {
            let weights = weights.resolve()?;
            if (weights.sum() - 1.0).abs() > 1e-9 {
                info!(sum = weights.sum(), "Weights do not sum to 1; scores are a plain weighted sum");
            }

            let result = rank(&input, &weights)
                .with_context(|| format!("ranking {}", input.display()))?;

            if let Some(path) = &output {
                write_rankings_csv(path, &result, gzip)?;
            }

            let stdout = std::io::stdout().lock();
            if json {
                let report = RankReport::new(&input.display().to_string(), weights, result);
                debug!(athletes = report.summary.athletes, "Writing JSON report");
                write_json(stdout, &report)?;
            } else {
                write_table(stdout, &result)?;
            }
        }
        Commands::Validate { input } => {
            let table = load_table(&input)
                .with_context(|| format!("validating {}", input.display()))?;
            let (records, rejected) = parse_rows(&table);

            println!(
                "{}: {} row(s), {} accepted, {} rejected (identifier column: {})",
                input.display(),
                table.rows.len(),
                records.len(),
                rejected.len(),
                table.id_column
            );
            for row in &rejected {
                println!("  row {}: {}", row.index, row.reason);
            }

            if !rejected.is_empty() {
                warn!(rejected = rejected.len(), "Validation found rejected rows");
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Weights { weights } => {
            let weights = weights.resolve()?;
            println!("{}", serde_json::to_string_pretty(&weights)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Logging setup: colored stderr + JSON rolling log file.
///
/// The returned guard flushes the file writer when dropped.
fn init_tracing() -> WorkerGuard {
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/tri_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("tri_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter("RUST_LOG", "info"));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(env_filter("RUST_LOG_JSON", "debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    file_guard
}

fn env_filter(var: &str, default: &str) -> EnvFilter {
    EnvFilter::try_from_env(var).unwrap_or_else(|_| EnvFilter::new(default))
}
