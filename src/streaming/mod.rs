//! Streamed chat-completion decoding and accumulation.
//!
//! Bytes from a response body flow through three layers:
//!
//! - [`decoder`]: UTF-8 and newline framing with carry-over between chunks
//! - [`record`]: one complete line to at most one [`Frame`]
//! - [`accumulator`]: frames into the running message and its snapshots

pub mod accumulator;
pub mod decoder;
pub mod record;
mod types;

pub use accumulator::StreamAccumulator;
pub use decoder::{split_lines, FrameDecoder, Utf8Decoder};
pub use record::{parse_payload, parse_record};
pub use types::{Frame, PartialResult};
