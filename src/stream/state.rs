//! Per-stream state tracked over the lifetime of a run.

use jsonschema::Validator;
use serde_json::Value;

/// Schema, validator, and header state for a single stream.
///
/// Created or overwritten whenever a SCHEMA message for the stream arrives.
/// The header is set lazily by the first RECORD of the run and survives
/// schema re-declarations.
pub struct StreamState {
    /// Schema document from the most recent SCHEMA message.
    pub schema: Value,
    /// Compiled Draft 4 validator derived from the schema document.
    /// Never persisted; recompiled on every declaration.
    pub(crate) validator: Validator,
    /// Key property names declared alongside the schema.
    pub key_properties: Vec<String>,
    /// Column order committed to the stream's output file, once established.
    pub header: Option<Vec<String>>,
}
