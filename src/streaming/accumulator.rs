//! Streaming response accumulator.

use super::types::{Frame, PartialResult};

/// Accumulates streamed tokens into a complete assistant message.
///
/// The buffer only ever grows by appending tokens in arrival order. The
/// snapshot for the latest token is held back until the next token or the end
/// of the stream shows up, so the last token's snapshot is the one carrying
/// `is_final`. The accumulator finishes exactly once, either on the terminator
/// frame or when the caller reports that the source ran dry; after that it
/// ignores input.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    buffer: String,
    // A snapshot of `buffer` is owed to the caller.
    held: bool,
    finished: bool,
}

impl StreamAccumulator {
    /// Create a new accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Text accumulated so far
    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Process a single frame, returning the snapshot to emit, if any
    ///
    /// A token releases the snapshot held for the previous token. Empty and
    /// missing tokens produce nothing. The terminator produces the final
    /// snapshot.
    pub fn process_frame(&mut self, frame: Frame) -> Option<PartialResult> {
        if self.finished {
            return None;
        }
        match frame {
            Frame::Done => self.finish(),
            Frame::Delta(Some(token)) if !token.is_empty() => {
                let released = self
                    .held
                    .then(|| PartialResult::partial(self.buffer.clone()));
                self.buffer.push_str(&token);
                self.held = true;
                released
            }
            Frame::Delta(_) => None,
        }
    }

    /// Mark the stream finished and return the final snapshot
    ///
    /// The final snapshot replaces any held one: it carries the same text.
    /// Returns `None` if the accumulator was already finished.
    pub fn finish(&mut self) -> Option<PartialResult> {
        if self.finished {
            return None;
        }
        self.finished = true;
        self.held = false;
        Some(PartialResult::finished(self.buffer.clone()))
    }
}

#[cfg(feature = "streaming")]
mod source {
    use std::fmt::Display;

    use futures_util::{Stream, StreamExt};
    use tracing::{debug, warn};

    use super::StreamAccumulator;
    use crate::config::StreamConfig;
    use crate::error::StreamError;
    use crate::streaming::decoder::FrameDecoder;
    use crate::streaming::types::PartialResult;

    impl StreamAccumulator {
        /// Start accumulating a response body.
        ///
        /// `source` is the body as a stream of byte chunks, such as
        /// `reqwest::Response::bytes_stream()`. `None` stands for a response
        /// without a body and fails with [`StreamError::Unavailable`] before
        /// anything is emitted. An invalid config fails the same way with
        /// [`StreamError::InvalidConfig`].
        ///
        /// The returned stream yields a snapshot per non-empty token, the last
        /// of which is marked final. A stream without any token yields a
        /// single empty final snapshot. It ends at the `[DONE]`
        /// sentinel, when the source closes, or when the source yields an
        /// error (logged, treated like the source closing). Dropping it drops
        /// the source.
        pub fn start<S, B, E>(
            source: Option<S>,
        ) -> Result<impl Stream<Item = PartialResult>, StreamError>
        where
            S: Stream<Item = Result<B, E>>,
            B: AsRef<[u8]>,
            E: Display,
        {
            Self::start_with_config(source, StreamConfig::default())
        }

        /// Same as [`start`](Self::start) with explicit decoder settings
        pub fn start_with_config<S, B, E>(
            source: Option<S>,
            config: StreamConfig,
        ) -> Result<impl Stream<Item = PartialResult>, StreamError>
        where
            S: Stream<Item = Result<B, E>>,
            B: AsRef<[u8]>,
            E: Display,
        {
            let decoder = FrameDecoder::with_config(&config)?;
            let source = source.ok_or(StreamError::Unavailable)?;
            Ok(accumulate(source, decoder))
        }

        /// Accumulate an entire body and return the final snapshot
        ///
        /// This is a convenience method for callers that only want the
        /// finished message.
        pub async fn accumulate_stream<S, B, E>(
            source: Option<S>,
        ) -> Result<PartialResult, StreamError>
        where
            S: Stream<Item = Result<B, E>>,
            B: AsRef<[u8]>,
            E: Display,
        {
            let stream = Self::start(source)?;
            let mut stream = std::pin::pin!(stream);

            let mut last = PartialResult::finished(String::new());
            while let Some(partial) = stream.next().await {
                last = partial;
            }
            Ok(last)
        }
    }

    fn accumulate<S, B, E>(source: S, mut decoder: FrameDecoder) -> impl Stream<Item = PartialResult>
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: Display,
    {
        async_stream::stream! {
            let mut source = std::pin::pin!(source);
            let mut accumulator = StreamAccumulator::new();
            let mut chunks = 0usize;

            while let Some(chunk) = source.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(error) => {
                        warn!(%error, chunks, "byte source failed, ending stream");
                        break;
                    }
                };
                chunks += 1;

                for frame in decoder.decode(chunk.as_ref()) {
                    if let Some(partial) = accumulator.process_frame(frame) {
                        yield partial;
                    }
                }
                if accumulator.is_finished() {
                    break;
                }
            }

            if !accumulator.is_finished() {
                debug!(chunks, "byte source closed without sentinel");
                for frame in decoder.finish() {
                    if let Some(partial) = accumulator.process_frame(frame) {
                        yield partial;
                    }
                }
            }
            if let Some(last) = accumulator.finish() {
                yield last;
            }
        }
    }
}
