//! Type definitions for streamed responses.

use serde::{Deserialize, Serialize};

/// One decoded `data:` record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Incremental delta; `None` when the record had no
    /// `choices[0].delta.content`
    Delta(Option<String>),
    /// Stream completed
    Done,
}

impl Frame {
    /// Create a delta frame carrying a token
    pub fn token(text: impl Into<String>) -> Self {
        Self::Delta(Some(text.into()))
    }

    pub fn is_terminator(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// The token text, if this frame carries one
    pub fn as_token(&self) -> Option<&str> {
        match self {
            Self::Delta(Some(text)) => Some(text),
            _ => None,
        }
    }
}

/// Snapshot of the accumulated response
///
/// `text` is always the whole message received so far, not the latest delta.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialResult {
    /// Accumulated text content
    pub text: String,
    /// Set on the last snapshot of a stream, and only there
    pub is_final: bool,
}

impl PartialResult {
    /// Create an in-progress snapshot
    pub fn partial(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }

    /// Create the closing snapshot
    pub fn finished(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }

    /// Turn the snapshot into the assistant message it represents
    pub fn into_message(self) -> crate::Message {
        crate::Message::assistant(self.text)
    }
}
