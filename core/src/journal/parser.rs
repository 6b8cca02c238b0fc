//! Line decoding for journal files.
//!
//! Every rejection is non-fatal: the caller logs it and moves on to the next
//! line.

use serde_json::{Map, Value};

use super::event::JournalEvent;

/// Maximum characters of a rejected line echoed into the log.
const LOG_PREVIEW_CHARS: usize = 120;

/// Why a line did not produce an event.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseRejection {
    #[error("empty line")]
    Empty,
    #[error("line is not valid UTF-8")]
    InvalidEncoding,
    #[error("invalid JSON: {0}")]
    InvalidJson(String),
    #[error("JSON value is not an object")]
    NotAnObject,
    #[error("record is missing string field `{0}`")]
    MissingField(&'static str),
}

/// Decode raw bytes from the tail reader.
pub fn parse_bytes(line: &[u8]) -> Result<JournalEvent, ParseRejection> {
    let text = std::str::from_utf8(line).map_err(|_| ParseRejection::InvalidEncoding)?;
    parse_line(text)
}

/// Decode one journal line into an event.
pub fn parse_line(line: &str) -> Result<JournalEvent, ParseRejection> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(ParseRejection::Empty);
    }

    let value: Value =
        serde_json::from_str(trimmed).map_err(|e| ParseRejection::InvalidJson(e.to_string()))?;

    let Value::Object(payload) = value else {
        return Err(ParseRejection::NotAnObject);
    };

    let timestamp = string_field(&payload, "timestamp")?;
    let event_type = string_field(&payload, "event")?;

    Ok(JournalEvent::new(timestamp, event_type, payload))
}

/// Log a rejected line with a truncated preview of its content.
pub fn log_rejection(reason: &ParseRejection, line: &[u8]) {
    tracing::warn!(
        reason = %reason,
        line = %preview(line),
        "Rejected journal line"
    );
}

fn string_field(payload: &Map<String, Value>, key: &'static str) -> Result<String, ParseRejection> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(ParseRejection::MissingField(key))
}

/// First `LOG_PREVIEW_CHARS` characters of a line, lossily decoded.
pub fn preview(line: &[u8]) -> String {
    let text = String::from_utf8_lossy(line);
    let mut out: String = text.chars().take(LOG_PREVIEW_CHARS).collect();
    if text.chars().count() > LOG_PREVIEW_CHARS {
        out.push_str("...");
    }
    out
}
