//! sleet: a standalone tool for persisting record streams as CSV files.
//!
//! Reads newline-delimited JSON protocol messages on stdin, appends each
//! stream's records to one CSV file per stream per run-day under the
//! configured output folder, and emits the final checkpoint as a single
//! JSON line on stdout.

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use serde_json::Value;
use snafu::prelude::*;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use sleet::error::{ConfigSnafu, EmitSnafu, PipelineError};
use sleet::{run_pipeline, Config};

/// Stream-to-CSV loading tool.
#[derive(Parser, Debug)]
#[command(name = "sleet")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the JSON configuration file.
    #[arg(short, long)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[snafu::report]
fn main() -> Result<(), PipelineError> {
    let args = Args::parse();

    // Diagnostics go to stderr; stdout carries only the checkpoint line.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("sleet starting");

    let config = Config::from_file(&args.config).context(ConfigSnafu)?;

    let stdin = std::io::stdin();
    let summary = run_pipeline(&config, stdin.lock())?;

    emit_state(summary.checkpoint.as_ref())?;

    info!("Pipeline completed successfully");
    info!("  Records written: {}", summary.stats.records_written);
    info!("  Schemas declared: {}", summary.stats.schemas_declared);
    info!("  States seen: {}", summary.stats.states_seen);

    Ok(())
}

/// Write the final checkpoint to stdout as a single JSON line.
///
/// Nothing is written when no checkpoint is standing.
fn emit_state(state: Option<&Value>) -> Result<(), PipelineError> {
    let Some(state) = state else {
        return Ok(());
    };

    let line = serde_json::to_string(state).expect("checkpoint value should always serialize");
    debug!("Emitting state {line}");

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{line}").context(EmitSnafu)?;
    stdout.flush().context(EmitSnafu)
}
