//! Error types for the sleet stream loader.

use snafu::prelude::*;

// ============ Config Errors ============

/// Errors that can occur during configuration parsing and validation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[snafu(display("Failed to read configuration file"))]
    ReadFile { source: std::io::Error },

    /// Failed to parse the JSON configuration.
    #[snafu(display("Failed to parse JSON configuration"))]
    JsonParse { source: serde_json::Error },

    /// Output folder is empty.
    #[snafu(display("Output folder cannot be empty"))]
    EmptyOutputFolder,
}

// ============ Decode Errors ============

/// Errors that can occur while decoding a protocol message line.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DecodeError {
    /// Input line is not valid JSON.
    #[snafu(display("Unable to parse message:\n{line}"))]
    MalformedJson {
        line: String,
        source: serde_json::Error,
    },

    /// Parsed JSON is not an object.
    #[snafu(display("Protocol message is not a JSON object:\n{line}"))]
    NotAnObject { line: String },

    /// Message has no type discriminator.
    #[snafu(display("Protocol message has no \"type\" field:\n{line}"))]
    MissingType { line: String },

    /// Message is missing a field required by its type.
    #[snafu(display("{message_type} message is missing field \"{field}\":\n{line}"))]
    MissingField {
        message_type: &'static str,
        field: &'static str,
        line: String,
    },

    /// A required field has the wrong JSON type.
    #[snafu(display("{message_type} message field \"{field}\" has an unexpected type:\n{line}"))]
    InvalidField {
        message_type: &'static str,
        field: &'static str,
        line: String,
    },
}

// ============ Registry Errors ============

/// Errors raised by the stream registry.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RegistryError {
    /// A record arrived before any schema for its stream.
    #[snafu(display(
        "A record for stream {stream} was encountered before a corresponding schema"
    ))]
    MissingSchema { stream: String },

    /// A record does not conform to its stream's declared schema.
    #[snafu(display("Record for stream {stream} failed schema validation:\n{violations}"))]
    Validation { stream: String, violations: String },

    /// The declared schema document is not a valid Draft 4 schema.
    #[snafu(display("Invalid schema for stream {stream}: {message}"))]
    SchemaCompile { stream: String, message: String },
}

// ============ Sink Errors ============

/// Errors that can occur while probing or appending to an output file.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SinkError {
    /// Failed to stat an output file.
    #[snafu(display("Failed to stat {path}"))]
    Metadata {
        path: String,
        source: std::io::Error,
    },

    /// Failed to open an output file.
    #[snafu(display("Failed to open {path}"))]
    Open {
        path: String,
        source: std::io::Error,
    },

    /// Failed to read the header row back from an existing file.
    #[snafu(display("Failed to read header row from {path}"))]
    ReadHeader { path: String, source: csv::Error },

    /// A non-empty file yielded no readable header row.
    #[snafu(display("Existing file {path} has no readable header row"))]
    CorruptHeader { path: String },

    /// Failed to write a row.
    #[snafu(display("Failed to write row to {path}"))]
    WriteRow { path: String, source: csv::Error },

    /// Failed to flush appended rows to disk.
    #[snafu(display("Failed to flush {path}"))]
    Flush {
        path: String,
        source: std::io::Error,
    },
}

// ============ Pipeline Errors ============

/// Top-level pipeline errors.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum PipelineError {
    /// Configuration error.
    #[snafu(display("Configuration error: {source}"))]
    Config { source: ConfigError },

    /// Message decode error.
    #[snafu(display("Decode error: {source}"))]
    Decode { source: DecodeError },

    /// Stream registry error.
    #[snafu(display("Stream error: {source}"))]
    Stream { source: RegistryError },

    /// Output file error.
    #[snafu(display("Sink error: {source}"))]
    Sink { source: SinkError },

    /// Failed to read a line from the input stream.
    #[snafu(display("Failed to read from input"))]
    Input { source: std::io::Error },

    /// Failed to write the checkpoint line to stdout.
    #[snafu(display("Failed to emit checkpoint"))]
    Emit { source: std::io::Error },
}

impl From<ConfigError> for PipelineError {
    fn from(source: ConfigError) -> Self {
        PipelineError::Config { source }
    }
}

impl From<DecodeError> for PipelineError {
    fn from(source: DecodeError) -> Self {
        PipelineError::Decode { source }
    }
}

impl From<RegistryError> for PipelineError {
    fn from(source: RegistryError) -> Self {
        PipelineError::Stream { source }
    }
}

impl From<SinkError> for PipelineError {
    fn from(source: SinkError) -> Self {
        PipelineError::Sink { source }
    }
}
