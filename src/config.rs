//! Decoder configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::streaming::record::DONE_SENTINEL;

/// Settings for decoding one event stream.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```rust
/// use chatstream::StreamConfig;
///
/// let config = StreamConfig::from_json(r#"{"max_line_bytes": 65536}"#).unwrap();
/// assert_eq!(config.done_sentinel, "[DONE]");
/// assert_eq!(config.max_line_bytes, Some(65536));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Payload that terminates the stream
    pub done_sentinel: String,
    /// Longest line kept while waiting for its newline; `None` means unbounded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_line_bytes: Option<usize>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            done_sentinel: DONE_SENTINEL.to_string(),
            max_line_bytes: None,
        }
    }
}

impl StreamConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the terminator payload
    pub fn with_done_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.done_sentinel = sentinel.into();
        self
    }

    /// Cap the size of a single buffered line
    pub fn with_max_line_bytes(mut self, limit: usize) -> Self {
        self.max_line_bytes = Some(limit);
        self
    }

    /// Parse and validate a JSON config document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.done_sentinel.trim().is_empty() {
            return Err(ConfigError::EmptySentinel);
        }
        if self.max_line_bytes == Some(0) {
            return Err(ConfigError::ZeroLineLimit);
        }
        Ok(())
    }
}
