//! The message-processing pipeline.
//!
//! Consumes protocol messages strictly in arrival order, dispatching each by
//! variant: SCHEMA messages feed the stream registry, RECORD messages are
//! validated, flattened, and appended to their stream's CSV file, and STATE
//! messages update the checkpoint handed back once input is exhausted.
//!
//! Every fatal condition (decode failure, record before schema, validation
//! failure, I/O error) aborts the run immediately; no message is skipped,
//! retried, or reprocessed.

use std::io::BufRead;

use chrono::{Local, NaiveDate};
use serde_json::Value;
use tracing::{debug, warn};

use crate::checkpoint::Checkpoint;
use crate::config::Config;
use crate::error::PipelineError;
use crate::flatten::flatten;
use crate::message::{decode_message, ProtocolMessage};
use crate::sink::CsvSink;
use crate::stream::StreamRegistry;

/// Counters reported after a completed run.
#[derive(Debug, Default, Clone, Copy)]
pub struct PipelineStats {
    /// Rows appended to output files.
    pub records_written: u64,
    /// SCHEMA messages processed (including re-declarations).
    pub schemas_declared: u64,
    /// STATE messages processed.
    pub states_seen: u64,
}

/// Result of a completed run.
#[derive(Debug)]
pub struct RunSummary {
    /// The last STATE value not followed by a record append, if any.
    pub checkpoint: Option<Value>,
    /// Run counters.
    pub stats: PipelineStats,
}

/// A single-run message pipeline.
pub struct Pipeline {
    registry: StreamRegistry,
    sink: CsvSink,
    checkpoint: Checkpoint,
    stats: PipelineStats,
}

impl Pipeline {
    /// Create a pipeline rooted at the configured output folder.
    ///
    /// The run date is captured here, once: every record for a stream lands
    /// in the same file no matter how long the run spans.
    pub fn new(config: &Config) -> Self {
        Self::with_run_date(config, Local::now().date_naive())
    }

    /// Create a pipeline with an explicit run date.
    pub fn with_run_date(config: &Config, run_date: NaiveDate) -> Self {
        Self {
            registry: StreamRegistry::new(),
            sink: CsvSink::new(config.output_folder.clone(), run_date),
            checkpoint: Checkpoint::new(),
            stats: PipelineStats::default(),
        }
    }

    /// Consume messages until EOF and return the last-standing checkpoint.
    pub fn run(mut self, input: impl BufRead) -> Result<RunSummary, PipelineError> {
        for line in input.lines() {
            let line = line.map_err(|source| PipelineError::Input { source })?;
            self.process_line(&line)?;
        }

        Ok(RunSummary {
            checkpoint: self.checkpoint.into_pending(),
            stats: self.stats,
        })
    }

    fn process_line(&mut self, line: &str) -> Result<(), PipelineError> {
        match decode_message(line)? {
            ProtocolMessage::Schema {
                stream,
                schema,
                key_properties,
            } => {
                debug!(stream = %stream, "Declaring schema");
                self.registry.declare_schema(&stream, schema, key_properties)?;
                self.stats.schemas_declared += 1;
            }
            ProtocolMessage::Record { stream, record } => {
                self.process_record(&stream, &record)?;
                self.stats.records_written += 1;
            }
            ProtocolMessage::State { value } => {
                debug!(value = %value, "Setting checkpoint");
                self.checkpoint.set(value);
                self.stats.states_seen += 1;
            }
            ProtocolMessage::Unknown { message_type, raw } => {
                warn!(message_type = %message_type, message = %raw, "Unknown message type");
            }
        }

        Ok(())
    }

    /// Validate, flatten, and append one record, then invalidate the
    /// checkpoint: a pending STATE value is only emittable while no record
    /// has been written after it.
    fn process_record(&mut self, stream: &str, record: &Value) -> Result<(), PipelineError> {
        self.registry.validate(stream, record)?;

        let flat = flatten(record);

        let path = self.sink.resolve_path(stream);
        let file_was_empty = self.sink.is_empty(&path)?;

        let record_keys: Vec<String> = flat.keys().cloned().collect();
        let sink = &self.sink;
        let header = self
            .registry
            .get_or_establish_header(stream, record_keys, || {
                if file_was_empty {
                    Ok(None)
                } else {
                    sink.read_header(&path)
                        .map(Some)
                        .map_err(PipelineError::from)
                }
            })?;

        self.sink.append_row(&path, &header, &flat, file_was_empty)?;
        self.checkpoint.invalidate();

        debug!(stream = %stream, path = %path.display(), "Appended record");

        Ok(())
    }
}

/// Run the pipeline over `input`, returning the final checkpoint and stats.
pub fn run_pipeline(config: &Config, input: impl BufRead) -> Result<RunSummary, PipelineError> {
    Pipeline::new(config).run(input)
}
