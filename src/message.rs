//! Protocol message decoding.
//!
//! Each input line carries one JSON-encoded message with a `type`
//! discriminator. SCHEMA, RECORD, and STATE messages are decoded into typed
//! variants; any other discriminator becomes [`ProtocolMessage::Unknown`] so
//! the caller can warn and skip without mutating state.

use serde_json::{Map, Value};
use snafu::prelude::*;

use crate::error::{
    DecodeError, InvalidFieldSnafu, MalformedJsonSnafu, MissingFieldSnafu, MissingTypeSnafu,
    NotAnObjectSnafu,
};

/// A decoded protocol message.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolMessage {
    /// Declares the schema and key properties for a stream.
    Schema {
        stream: String,
        /// Draft 4 JSON Schema document (always a JSON object).
        schema: Value,
        key_properties: Vec<String>,
    },
    /// A single data record belonging to a stream.
    Record {
        stream: String,
        /// The record payload (always a JSON object).
        record: Value,
    },
    /// An opaque checkpoint value.
    State { value: Value },
    /// A message with an unrecognized type discriminator.
    Unknown {
        message_type: String,
        /// The full message, kept for the warning log.
        raw: Value,
    },
}

/// Decode one line of input into a protocol message.
///
/// Malformed JSON, non-object messages, and missing or ill-typed required
/// fields are fatal decode errors carrying the offending line.
pub fn decode_message(line: &str) -> Result<ProtocolMessage, DecodeError> {
    let value: Value = serde_json::from_str(line).context(MalformedJsonSnafu { line })?;

    let Value::Object(fields) = value else {
        return NotAnObjectSnafu { line }.fail();
    };

    let message_type = fields
        .get("type")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .context(MissingTypeSnafu { line })?;

    match message_type.as_str() {
        "SCHEMA" => decode_schema(fields, line),
        "RECORD" => decode_record(fields, line),
        "STATE" => decode_state(fields, line),
        _ => Ok(ProtocolMessage::Unknown {
            message_type,
            raw: Value::Object(fields),
        }),
    }
}

fn decode_schema(mut fields: Map<String, Value>, line: &str) -> Result<ProtocolMessage, DecodeError> {
    let stream = take_string(&mut fields, "SCHEMA", "stream", line)?;

    let schema = match fields.remove("schema") {
        Some(schema @ Value::Object(_)) => schema,
        Some(_) => {
            return InvalidFieldSnafu {
                message_type: "SCHEMA",
                field: "schema",
                line,
            }
            .fail();
        }
        None => {
            return MissingFieldSnafu {
                message_type: "SCHEMA",
                field: "schema",
                line,
            }
            .fail();
        }
    };

    let key_properties = match fields.remove("key_properties") {
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(name) => Ok(name),
                _ => InvalidFieldSnafu {
                    message_type: "SCHEMA",
                    field: "key_properties",
                    line,
                }
                .fail(),
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => {
            return InvalidFieldSnafu {
                message_type: "SCHEMA",
                field: "key_properties",
                line,
            }
            .fail();
        }
        None => {
            return MissingFieldSnafu {
                message_type: "SCHEMA",
                field: "key_properties",
                line,
            }
            .fail();
        }
    };

    Ok(ProtocolMessage::Schema {
        stream,
        schema,
        key_properties,
    })
}

fn decode_record(mut fields: Map<String, Value>, line: &str) -> Result<ProtocolMessage, DecodeError> {
    let stream = take_string(&mut fields, "RECORD", "stream", line)?;

    let record = match fields.remove("record") {
        Some(record @ Value::Object(_)) => record,
        Some(_) => {
            return InvalidFieldSnafu {
                message_type: "RECORD",
                field: "record",
                line,
            }
            .fail();
        }
        None => {
            return MissingFieldSnafu {
                message_type: "RECORD",
                field: "record",
                line,
            }
            .fail();
        }
    };

    Ok(ProtocolMessage::Record { stream, record })
}

fn decode_state(mut fields: Map<String, Value>, line: &str) -> Result<ProtocolMessage, DecodeError> {
    let value = fields.remove("value").context(MissingFieldSnafu {
        message_type: "STATE",
        field: "value",
        line,
    })?;

    Ok(ProtocolMessage::State { value })
}

fn take_string(
    fields: &mut Map<String, Value>,
    message_type: &'static str,
    field: &'static str,
    line: &str,
) -> Result<String, DecodeError> {
    match fields.remove(field) {
        Some(Value::String(value)) => Ok(value),
        Some(_) => InvalidFieldSnafu {
            message_type,
            field,
            line,
        }
        .fail(),
        None => MissingFieldSnafu {
            message_type,
            field,
            line,
        }
        .fail(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_schema() {
        let line = r#"{"type": "SCHEMA", "stream": "users", "schema": {"type": "object"}, "key_properties": ["id"]}"#;
        let message = decode_message(line).unwrap();

        assert_eq!(
            message,
            ProtocolMessage::Schema {
                stream: "users".to_string(),
                schema: json!({"type": "object"}),
                key_properties: vec!["id".to_string()],
            }
        );
    }

    #[test]
    fn test_decode_record() {
        let line = r#"{"type": "RECORD", "stream": "users", "record": {"id": 1, "name": "alice"}}"#;
        let message = decode_message(line).unwrap();

        assert_eq!(
            message,
            ProtocolMessage::Record {
                stream: "users".to_string(),
                record: json!({"id": 1, "name": "alice"}),
            }
        );
    }

    #[test]
    fn test_decode_state() {
        let line = r#"{"type": "STATE", "value": {"bookmark": 42}}"#;
        let message = decode_message(line).unwrap();

        assert_eq!(
            message,
            ProtocolMessage::State {
                value: json!({"bookmark": 42}),
            }
        );
    }

    #[test]
    fn test_decode_unknown_type() {
        let line = r#"{"type": "ACTIVATE_VERSION", "stream": "users", "version": 3}"#;
        let message = decode_message(line).unwrap();

        match message {
            ProtocolMessage::Unknown { message_type, raw } => {
                assert_eq!(message_type, "ACTIVATE_VERSION");
                assert_eq!(raw["version"], json!(3));
            }
            other => panic!("Expected Unknown, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_malformed_json() {
        let err = decode_message("{not json").unwrap_err();
        assert!(matches!(err, DecodeError::MalformedJson { .. }));
        assert!(err.to_string().contains("{not json"));
    }

    #[test]
    fn test_decode_empty_line() {
        let err = decode_message("").unwrap_err();
        assert!(matches!(err, DecodeError::MalformedJson { .. }));
    }

    #[test]
    fn test_decode_non_object() {
        let err = decode_message(r#"["not", "an", "object"]"#).unwrap_err();
        assert!(matches!(err, DecodeError::NotAnObject { .. }));
    }

    #[test]
    fn test_decode_missing_type() {
        let err = decode_message(r#"{"stream": "users"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingType { .. }));
    }

    #[test]
    fn test_decode_record_missing_stream() {
        let err = decode_message(r#"{"type": "RECORD", "record": {"id": 1}}"#).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MissingField {
                message_type: "RECORD",
                field: "stream",
                ..
            }
        ));
    }

    #[test]
    fn test_decode_record_non_object_payload() {
        let err =
            decode_message(r#"{"type": "RECORD", "stream": "users", "record": [1, 2]}"#).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidField {
                message_type: "RECORD",
                field: "record",
                ..
            }
        ));
    }

    #[test]
    fn test_decode_schema_bad_key_properties() {
        let line = r#"{"type": "SCHEMA", "stream": "users", "schema": {}, "key_properties": [1]}"#;
        let err = decode_message(line).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidField {
                field: "key_properties",
                ..
            }
        ));
    }

    #[test]
    fn test_decode_state_missing_value() {
        let err = decode_message(r#"{"type": "STATE"}"#).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MissingField {
                message_type: "STATE",
                field: "value",
                ..
            }
        ));
    }

    #[test]
    fn test_decode_state_null_value() {
        let message = decode_message(r#"{"type": "STATE", "value": null}"#).unwrap();
        assert_eq!(message, ProtocolMessage::State { value: Value::Null });
    }
}
