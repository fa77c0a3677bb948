//! Chat Stream Accumulator
//!
//! This crate turns a streamed chat-completion response into the assistant
//! message a chat view displays. The response arrives as an event stream:
//! newline-delimited `data:` records carrying OpenAI-compatible JSON chunks,
//! closed by a `data: [DONE]` sentinel.
//!
//! ## Streaming Usage
//!
//! ```rust,ignore
//! use chatstream::{Conversation, StreamAccumulator};
//! use futures_util::StreamExt;
//!
//! let mut conversation = Conversation::new();
//! let request = conversation.submit("Hello there")?;
//!
//! // The transport is the caller's concern: post `request`, get a body stream.
//! let body = send(request).await?.bytes_stream();
//!
//! let stream = StreamAccumulator::start(Some(body))?;
//! futures_util::pin_mut!(stream);
//! while let Some(partial) = stream.next().await {
//!     conversation.apply(&partial);
//!     render(conversation.messages());
//! }
//! ```
//!
//! ## Core Principles
//!
//! 1. **Full snapshots**: every [`PartialResult`] carries the whole message so
//!    far, never just the delta
//! 2. **Exactly one final**: the last emitted value, and only that one, has
//!    `is_final` set, whether the sentinel was seen or the source simply closed
//! 3. **Chunking-independent**: record and UTF-8 boundaries may fall anywhere
//!    in the input chunks without changing the result
//! 4. **Malformed records are skipped**: a bad payload is logged, never fatal
//!
//! ## Conversation Bookkeeping
//!
//! ```rust
//! use chatstream::{Conversation, MessageRole, PartialResult};
//!
//! let mut conversation = Conversation::new();
//! let request = conversation.submit("  What is Rust?  ").unwrap();
//! assert_eq!(request.messages.len(), 1);
//! assert_eq!(request.messages[0].content, "What is Rust?");
//!
//! conversation.apply(&PartialResult::partial("A systems"));
//! conversation.apply(&PartialResult::finished("A systems language."));
//!
//! let last = conversation.last().unwrap();
//! assert_eq!(last.role, MessageRole::Assistant);
//! assert_eq!(last.content, "A systems language.");
//! assert!(!conversation.is_streaming());
//! ```

use serde::{Deserialize, Serialize};

pub mod config;
pub mod error;
pub mod streaming;

pub use config::StreamConfig;
pub use error::{ConfigError, ConversationError, RecordError, StreamError};
pub use streaming::{Frame, FrameDecoder, PartialResult, StreamAccumulator};

// ============================================================================
// Core Message Types
// ============================================================================

/// A single message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who wrote the message
    pub role: MessageRole,
    /// Plain-text message body
    pub content: String,
}

impl Message {
    /// Create a system message
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: text.into(),
        }
    }

    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: text.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: text.into(),
        }
    }
}

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System-level instructions
    System,
    /// User input
    User,
    /// Assistant response
    Assistant,
}

impl MessageRole {
    /// Convert to string representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Request Body
// ============================================================================

/// Body posted to the chat endpoint: `{"messages": [...]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Conversation history, oldest first
    pub messages: Vec<Message>,
}

impl ChatRequest {
    /// Create a request from a message history
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// Reject a request with no messages, the one shape the endpoint refuses
    pub fn validate(&self) -> Result<(), ConversationError> {
        if self.messages.is_empty() {
            return Err(ConversationError::EmptyRequest);
        }
        Ok(())
    }
}

// ============================================================================
// Conversation
// ============================================================================

/// Where the conversation is in its current request/reply turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnState {
    /// No request in flight; new input is accepted
    #[default]
    Idle,
    /// A request was submitted but no reply has started
    Awaiting,
    /// An assistant reply is being accumulated into the last message
    Streaming,
}

/// Ordered chat history plus the idle/streaming state of the current turn
///
/// The conversation never decodes anything itself. It takes the
/// [`PartialResult`]s produced by a [`StreamAccumulator`] and mirrors them into
/// a single trailing assistant message.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    state: TurnState,
}

impl Conversation {
    /// Create an empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a conversation seeded with earlier messages
    pub fn with_messages(messages: Vec<Message>) -> Self {
        Self {
            messages,
            state: TurnState::Idle,
        }
    }

    /// Messages in chronological order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Most recent message
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Current turn state
    pub fn state(&self) -> TurnState {
        self.state
    }

    /// Whether a turn is in flight (submitted or streaming)
    pub fn is_streaming(&self) -> bool {
        self.state != TurnState::Idle
    }

    /// Start a new turn with the user's input
    ///
    /// The input is trimmed. Blank input and input arriving while another turn
    /// is in flight are rejected without touching the history. On success the
    /// user message is appended and the returned request carries the whole
    /// history including it.
    pub fn submit(&mut self, input: &str) -> Result<ChatRequest, ConversationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ConversationError::EmptyInput);
        }
        if self.is_streaming() {
            return Err(ConversationError::Busy);
        }

        self.messages.push(Message::user(trimmed));
        self.state = TurnState::Awaiting;

        let request = ChatRequest::new(self.messages.clone());
        request.validate()?;
        Ok(request)
    }

    /// Append the empty assistant message that streamed text will fill
    ///
    /// Called once the response body is available. Does nothing unless a
    /// submitted turn is awaiting its reply.
    pub fn begin_reply(&mut self) {
        if self.state == TurnState::Awaiting {
            self.messages.push(Message::assistant(String::new()));
            self.state = TurnState::Streaming;
        }
    }

    /// Mirror an accumulator snapshot into the trailing assistant message
    pub fn apply(&mut self, partial: &PartialResult) {
        if self.state == TurnState::Idle {
            tracing::debug!(is_final = partial.is_final, "ignoring partial result outside a turn");
            return;
        }
        self.begin_reply();

        if let Some(last) = self.messages.last_mut() {
            last.content.clear();
            last.content.push_str(&partial.text);
        }
        if partial.is_final {
            self.state = TurnState::Idle;
        }
    }

    /// Abandon the current turn, keeping whatever text already arrived
    pub fn abort(&mut self) {
        if self.state != TurnState::Idle {
            tracing::debug!(state = ?self.state, "aborting conversation turn");
        }
        self.state = TurnState::Idle;
    }
}

// ============================================================================
// Tests
// ============================================================================
