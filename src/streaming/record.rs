//! Parsing of single event-stream lines.

use serde_json::Value;

use super::types::Frame;
use crate::error::RecordError;

/// Prefix marking a line as a data record
pub const DATA_PREFIX: &str = "data:";

/// Payload that ends the stream
pub const DONE_SENTINEL: &str = "[DONE]";

const CONTENT_POINTER: &str = "/choices/0/delta/content";

/// Parse one complete line using the default `[DONE]` sentinel.
///
/// Returns `None` for lines that are not data records (comments, `event:`,
/// `id:`, blank separators). A data record yields either a [`Frame`] or a
/// [`RecordError`] the caller is expected to log and skip.
pub fn parse_record(line: &str) -> Option<Result<Frame, RecordError>> {
    parse_record_with(line, DONE_SENTINEL)
}

/// Same as [`parse_record`] with an explicit terminator payload.
pub fn parse_record_with(line: &str, sentinel: &str) -> Option<Result<Frame, RecordError>> {
    let payload = line.strip_prefix(DATA_PREFIX)?.trim();
    if payload == sentinel {
        return Some(Ok(Frame::Done));
    }
    Some(parse_payload(payload).map(Frame::Delta))
}

/// Extract `choices[0].delta.content` from a JSON payload.
///
/// Valid JSON without that path, including an absent or empty `choices`
/// array or a non-string `content`, is `Ok(None)` rather than an error: the
/// upstream schema is not ours to police.
pub fn parse_payload(payload: &str) -> Result<Option<String>, RecordError> {
    let value: Value = serde_json::from_str(payload).map_err(|source| RecordError::InvalidJson {
        payload: payload.to_string(),
        source,
    })?;

    Ok(value
        .pointer(CONTENT_POINTER)
        .and_then(Value::as_str)
        .map(str::to_owned))
}
