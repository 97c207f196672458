//! Date-partitioned CSV file sink.
//!
//! Each stream maps to exactly one file per run date:
//! `<output_folder>/<stream>--<YYYY-MM-DD>.csv`. Every append opens the file
//! fresh and closes it before the next message is processed, so an aborted
//! run can only lose the row being written, never corrupt earlier ones.
//!
//! Quoting is applied only where the content requires it (embedded comma,
//! quote, or newline).

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde_json::{Map, Value};
use snafu::prelude::*;

use crate::error::{
    CorruptHeaderSnafu, FlushSnafu, MetadataSnafu, OpenSnafu, ReadHeaderSnafu, SinkError,
    WriteRowSnafu,
};

/// Writes stream records to per-stream, per-day CSV files.
#[derive(Debug, Clone)]
pub struct CsvSink {
    output_folder: PathBuf,
    run_date: NaiveDate,
}

impl CsvSink {
    /// Create a sink rooted at `output_folder` for a fixed run date.
    ///
    /// The date is captured once per run: all records for a stream land in
    /// the same file no matter how long the run spans.
    pub fn new(output_folder: impl Into<PathBuf>, run_date: NaiveDate) -> Self {
        Self {
            output_folder: output_folder.into(),
            run_date,
        }
    }

    /// Resolve the output file for a stream on this run's date.
    pub fn resolve_path(&self, stream: &str) -> PathBuf {
        let date = self.run_date.format("%Y-%m-%d");
        self.output_folder.join(format!("{stream}--{date}.csv"))
    }

    /// Whether the file is absent or zero-length.
    pub fn is_empty(&self, path: &Path) -> Result<bool, SinkError> {
        match std::fs::metadata(path) {
            Ok(metadata) => Ok(metadata.len() == 0),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(true),
            Err(error) => Err(error).context(MetadataSnafu {
                path: path.display().to_string(),
            }),
        }
    }

    /// Read the header row back from an existing, non-empty file.
    ///
    /// A non-empty file that yields no parseable first record aborts the
    /// run: silently re-deriving a header would commit a second, mismatched
    /// column order into the middle of the file.
    pub fn read_header(&self, path: &Path) -> Result<Vec<String>, SinkError> {
        let file = File::open(path).context(OpenSnafu {
            path: path.display().to_string(),
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(file);

        let mut record = csv::StringRecord::new();
        let found = reader.read_record(&mut record).context(ReadHeaderSnafu {
            path: path.display().to_string(),
        })?;

        if !found {
            return CorruptHeaderSnafu {
                path: path.display().to_string(),
            }
            .fail();
        }

        Ok(record.iter().map(str::to_string).collect())
    }

    /// Append one row, writing the header first when the file was empty.
    ///
    /// The file handle is scoped to this call and closed on every exit
    /// path. Record keys not in the header are dropped; header columns
    /// missing from the record render as empty fields.
    pub fn append_row(
        &self,
        path: &Path,
        header: &[String],
        record: &Map<String, Value>,
        write_header: bool,
    ) -> Result<(), SinkError> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .context(OpenSnafu {
                path: path.display().to_string(),
            })?;

        let mut writer = csv::WriterBuilder::new().from_writer(file);

        if write_header {
            writer.write_record(header).context(WriteRowSnafu {
                path: path.display().to_string(),
            })?;
        }

        let row: Vec<String> = header
            .iter()
            .map(|column| record.get(column).map(render_field).unwrap_or_default())
            .collect();

        writer.write_record(&row).context(WriteRowSnafu {
            path: path.display().to_string(),
        })?;

        writer.flush().context(FlushSnafu {
            path: path.display().to_string(),
        })
    }
}

/// Render a flattened value as CSV field text.
///
/// Strings are written verbatim, null as the empty field; everything else
/// uses its JSON text form.
fn render_field(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
