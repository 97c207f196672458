//! In-memory registry of per-stream schema, validator, and header state.
//!
//! The registry lives inside the pipeline for exactly one run. Schemas may
//! be re-declared at any time; an established header never changes for the
//! rest of the run, keeping every row of a file on the column order its
//! header committed to.

pub mod state;

pub use state::StreamState;

use std::collections::HashMap;

use jsonschema::Draft;
use serde_json::Value;
use snafu::prelude::*;
use tracing::debug;

use crate::error::{MissingSchemaSnafu, RegistryError, ValidationSnafu};

/// Registry of all streams seen in this run, keyed by stream name.
#[derive(Default)]
pub struct StreamRegistry {
    streams: HashMap<String, StreamState>,
}

impl StreamRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store or overwrite the schema for a stream.
    ///
    /// Compiles a Draft 4 validator from the document; a document that does
    /// not compile is rejected here, next to the message that carried it.
    /// An already-established header is left untouched.
    pub fn declare_schema(
        &mut self,
        stream: &str,
        schema: Value,
        key_properties: Vec<String>,
    ) -> Result<(), RegistryError> {
        let validator = jsonschema::options()
            .with_draft(Draft::Draft4)
            .build(&schema)
            .map_err(|error| RegistryError::SchemaCompile {
                stream: stream.to_string(),
                message: error.to_string(),
            })?;

        match self.streams.get_mut(stream) {
            Some(state) => {
                state.schema = schema;
                state.validator = validator;
                state.key_properties = key_properties;
            }
            None => {
                self.streams.insert(
                    stream.to_string(),
                    StreamState {
                        schema,
                        validator,
                        key_properties,
                        header: None,
                    },
                );
            }
        }

        Ok(())
    }

    /// Validate a record against its stream's declared schema.
    ///
    /// Collects every violation into one error rather than stopping at the
    /// first.
    pub fn validate(&self, stream: &str, record: &Value) -> Result<(), RegistryError> {
        let state = self
            .streams
            .get(stream)
            .context(MissingSchemaSnafu { stream })?;

        let violations: Vec<String> = state
            .validator
            .iter_errors(record)
            .map(|error| format!("  - {error}"))
            .collect();

        if !violations.is_empty() {
            return ValidationSnafu {
                stream,
                violations: violations.join("\n"),
            }
            .fail();
        }

        Ok(())
    }

    /// Return the header for a stream, establishing it on first use.
    ///
    /// Prefers the header reported by `read_existing` (the first line of a
    /// non-empty output file); falls back to `record_keys` when the file is
    /// empty or absent. The result is cached for the rest of the run.
    pub fn get_or_establish_header<E>(
        &mut self,
        stream: &str,
        record_keys: Vec<String>,
        read_existing: impl FnOnce() -> Result<Option<Vec<String>>, E>,
    ) -> Result<Vec<String>, E>
    where
        E: From<RegistryError>,
    {
        let Some(state) = self.streams.get_mut(stream) else {
            return Err(RegistryError::MissingSchema {
                stream: stream.to_string(),
            }
            .into());
        };

        if let Some(header) = &state.header {
            return Ok(header.clone());
        }

        let header = match read_existing()? {
            Some(header) => header,
            None => record_keys,
        };

        debug!(stream = %stream, columns = header.len(), "Established header");
        state.header = Some(header.clone());

        Ok(header)
    }

    /// The established header for a stream, if any.
    pub fn header(&self, stream: &str) -> Option<&[String]> {
        self.streams
            .get(stream)?
            .header
            .as_deref()
    }
}
