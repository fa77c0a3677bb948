//! Chunk-to-frame decoding.
//!
//! Chunk boundaries carry no meaning on the wire: a chunk may end in the
//! middle of a line, a JSON value or a multi-byte character. The decoders here
//! keep whatever is incomplete and only hand complete lines to the record
//! parser.

use tracing::{debug, trace, warn};

use super::record::parse_record_with;
use super::types::Frame;
use crate::config::StreamConfig;
use crate::error::ConfigError;

/// Incremental UTF-8 decoder.
///
/// Bytes of a character split across chunks are held back until the rest
/// arrives. Invalid sequences decode to U+FFFD instead of failing.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a chunk, returning all text that is complete so far
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(chunk);

        let mut text = String::with_capacity(bytes.len());
        let mut rest = bytes.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    text.push_str(valid);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    text.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(len) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            // Incomplete sequence at the end; wait for more.
                            self.pending = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        text
    }

    /// Number of bytes held back for the next chunk
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Flush held-back bytes once the source is exhausted
    pub fn finish(&mut self) -> String {
        let pending = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&pending).into_owned()
    }
}

/// Split text into newline-terminated lines and the unterminated remainder.
///
/// A trailing `\r` is removed from each complete line. The remainder is
/// returned untouched so it can be prefixed to the next chunk.
pub fn split_lines(text: &str) -> (Vec<&str>, &str) {
    match text.rfind('\n') {
        Some(pos) => {
            let lines = text[..pos]
                .split('\n')
                .map(|line| line.strip_suffix('\r').unwrap_or(line))
                .collect();
            (lines, &text[pos + 1..])
        }
        None => (Vec::new(), text),
    }
}

/// Turns raw chunks into [`Frame`]s.
///
/// Malformed records are logged and skipped here, so the frames handed out
/// are always usable. Nothing is produced after the terminator frame.
#[derive(Debug)]
pub struct FrameDecoder {
    utf8: Utf8Decoder,
    carry: String,
    sentinel: String,
    max_line_bytes: Option<usize>,
    // Dropping the rest of an overlong line until its newline shows up.
    discarding: bool,
    done: bool,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::from_valid(&StreamConfig::default())
    }
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a decoder from settings, rejecting ones that fail validation
    pub fn with_config(config: &StreamConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: &StreamConfig) -> Self {
        Self {
            utf8: Utf8Decoder::new(),
            carry: String::new(),
            sentinel: config.done_sentinel.clone(),
            max_line_bytes: config.max_line_bytes,
            discarding: false,
            done: false,
        }
    }

    /// Whether the terminator record has been seen
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Decode one chunk into zero or more frames
    pub fn decode(&mut self, chunk: &[u8]) -> Vec<Frame> {
        let mut frames = Vec::new();
        if self.done {
            return frames;
        }

        let text = self.utf8.decode(chunk);
        let mut text = text.as_str();
        if self.discarding {
            match text.find('\n') {
                Some(pos) => {
                    self.discarding = false;
                    text = &text[pos + 1..];
                }
                None => return frames,
            }
        }

        // Only the new text can hold a newline the carry-over didn't.
        let appended_at = self.carry.len();
        self.carry.push_str(text);

        if let Some(pos) = self.carry[appended_at..].rfind('\n') {
            let complete: String = self.carry.drain(..=appended_at + pos).collect();
            let (lines, _) = split_lines(&complete);
            for line in lines {
                self.process_line(line, &mut frames);
                if self.done {
                    self.carry.clear();
                    return frames;
                }
            }
        }

        if self.exceeds_limit(&self.carry) {
            warn!(
                bytes = self.carry.len(),
                limit = ?self.max_line_bytes,
                "dropping overlong event-stream line"
            );
            self.carry.clear();
            self.discarding = true;
        }
        frames
    }

    /// Flush the unterminated tail once the source has closed
    pub fn finish(mut self) -> Vec<Frame> {
        let mut frames = Vec::new();
        if self.done || self.discarding {
            return frames;
        }

        let tail = self.utf8.finish();
        let mut line = std::mem::take(&mut self.carry);
        line.push_str(&tail);
        let line = line.strip_suffix('\r').unwrap_or(line.as_str());
        if !line.is_empty() {
            self.process_line(line, &mut frames);
        }
        frames
    }

    fn process_line(&mut self, line: &str, frames: &mut Vec<Frame>) {
        if self.exceeds_limit(line) {
            warn!(
                bytes = line.len(),
                limit = ?self.max_line_bytes,
                "dropping overlong event-stream line"
            );
            return;
        }

        match parse_record_with(line, &self.sentinel) {
            None => {
                if !line.is_empty() {
                    trace!(line, "ignoring non-data line");
                }
            }
            Some(Ok(Frame::Done)) => {
                debug!("event stream terminated by sentinel");
                self.done = true;
                frames.push(Frame::Done);
            }
            Some(Ok(frame)) => {
                if frame.as_token().is_none() {
                    trace!(line, "record has no delta content");
                }
                frames.push(frame);
            }
            Some(Err(error)) => {
                warn!(%error, "skipping malformed event-stream record");
            }
        }
    }

    fn exceeds_limit(&self, line: &str) -> bool {
        self.max_line_bytes.is_some_and(|limit| line.len() > limit)
    }
}
