//! Roofline metrics from an Nsight Compute counter report.
//!
//! Reads `ncu-<LABEL>.out`, accumulates the tracked counters and writes
//! `helper-<LABEL>.out` holding every counter total followed by FLOPs, memory
//! traffic, elapsed time, arithmetic intensity and throughput.

#![allow(clippy::print_stdout)]

use std::path::PathBuf;

use clap::Parser;
use roofline::{
    config::{self, Config, Settings},
    report,
};
use roofline_metrics::derive::TimeStrategy;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Report label: reads ncu-<LABEL>.out, writes helper-<LABEL>.out
    label: String,

    /// Time estimation strategy, cycle-vs-dram or cycle-only
    #[clap(short, long)]
    strategy: Option<TimeStrategy>,

    /// Path to a YAML configuration file
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the ncu report
    #[clap(long)]
    input_dir: Option<PathBuf>,

    /// Directory receiving the helper report
    #[clap(long)]
    output_dir: Option<PathBuf>,

    /// Print the rendered report to stdout as well
    #[clap(long)]
    stdout: bool,
}

impl Args {
    /// Resolve settings, with flags given here taking precedence over
    /// `file_config`.
    fn into_settings(self, file_config: Config) -> Settings {
        let cli_config = Config {
            strategy: self.strategy,
            input_dir: self.input_dir,
            output_dir: self.output_dir,
        };
        Settings::new(self.label, file_config.overlay(cli_config))
    }
}

#[derive(thiserror::Error, Debug)]
enum Error {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] config::Error),
    #[error(transparent)]
    Report(#[from] report::Error),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish()
        .init();

    let args = Args::parse();

    let file_config = match &args.config {
        Some(path) => Config::from_path(path).inspect_err(|e| {
            error!("Could not load configuration at {}: {e}", path.display());
        })?,
        None => Config::default(),
    };
    let print = args.stdout;
    let settings = args.into_settings(file_config);

    let outcome = report::run(&settings).await.inspect_err(|e| {
        error!("{e}");
    })?;

    if print {
        print!("{}", outcome.text);
    }
    info!(
        output = %outcome.output_path.display(),
        bound = ?outcome.derived.bound,
        "Report written"
    );
    Ok(())
}
