//! Error types for stream accumulation, record parsing and conversations.

/// Hard failures that stop a streaming operation before anything is emitted.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The response had no body to read.
    #[error("stream unavailable: response carried no body")]
    Unavailable,
    /// The decoder settings were rejected.
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}

/// A `data:` record whose payload could not be turned into a frame.
///
/// The accumulator recovers from these by logging and skipping the record.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The payload is not valid JSON.
    #[error("malformed record payload {payload:?}: {source}")]
    InvalidJson {
        /// The trimmed payload text
        payload: String,
        source: serde_json::Error,
    },
}

/// Rejected conversation operations.
#[derive(Debug, thiserror::Error)]
pub enum ConversationError {
    /// User input was blank after trimming.
    #[error("input is empty")]
    EmptyInput,
    /// A turn is already in flight.
    #[error("a reply is still streaming")]
    Busy,
    /// A request must carry at least one message.
    #[error("messages must be a non-empty list")]
    EmptyRequest,
}

/// Errors loading a [`StreamConfig`](crate::StreamConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid stream config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("done sentinel must not be empty")]
    EmptySentinel,
    #[error("max_line_bytes must be greater than zero")]
    ZeroLineLimit,
}
