//! sleet: A stream loader for persisting record streams as CSV files.
//!
//! This library consumes newline-delimited JSON protocol messages (SCHEMA,
//! RECORD, STATE) describing named data streams and appends each stream's
//! records to one date-partitioned CSV file per run-day, preserving the
//! column order already committed to disk. The last-standing checkpoint is
//! handed back at end of run for the caller to emit.
//!
//! # Example
//!
//! ```ignore
//! use sleet::{run_pipeline, Config, error::PipelineError};
//!
//! fn main() -> Result<(), PipelineError> {
//!     let config = Config::from_file("config.json".as_ref())?;
//!     let stdin = std::io::stdin();
//!     let summary = run_pipeline(&config, stdin.lock())?;
//!     println!("Wrote {} records", summary.stats.records_written);
//!     Ok(())
//! }
//! ```

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod flatten;
pub mod message;
pub mod pipeline;
pub mod sink;
pub mod stream;

// Re-export main types
pub use config::Config;
pub use error::PipelineError;
pub use pipeline::{run_pipeline, Pipeline, PipelineStats, RunSummary};
