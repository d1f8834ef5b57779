//! Incremental decoder for the newline-delimited completion stream.
//!
//! The endpoint streams `data: <json>` records separated by newlines.
//! Network chunks arrive on arbitrary byte boundaries, including inside a
//! multi-byte UTF-8 character, so decode state carries across calls.

use crate::stream::StreamFrame;
use crate::types::DeltaChunk;

/// Payload of the terminal record
const DONE_SENTINEL: &str = "[DONE]";
/// Prefix of significant records; anything else is a keep-alive or comment
const DATA_PREFIX: &str = "data: ";

/// Push-based decoder turning raw byte chunks into [`StreamFrame`]s.
#[derive(Debug, Default)]
pub struct SseDecoder {
    /// Decoded text not yet consumed as a full line
    buf: String,
    /// Trailing bytes of an incomplete UTF-8 sequence from the last chunk
    partial: Vec<u8>,
    /// Set once the terminal sentinel is seen; later input is discarded
    done: bool,
}

impl SseDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the terminal sentinel has been seen
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed one chunk of bytes, returning every frame it completes.
    ///
    /// Only complete lines produce frames; a line cut off mid-chunk stays
    /// buffered until its newline arrives.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamFrame> {
        if self.done {
            return Vec::new();
        }
        self.decode_utf8(chunk);

        let mut frames = Vec::new();
        while let Some(line) = self.take_line() {
            match parse_line(&line) {
                Some(StreamFrame::Done) => {
                    self.done = true;
                    self.buf.clear();
                    self.partial.clear();
                    frames.push(StreamFrame::Done);
                    break;
                }
                Some(frame) => frames.push(frame),
                None => {}
            }
        }
        frames
    }

    /// Lossy incremental UTF-8 decode. An incomplete trailing sequence is
    /// held back for the next chunk; an invalid sequence becomes U+FFFD.
    fn decode_utf8(&mut self, chunk: &[u8]) {
        let mut bytes = std::mem::take(&mut self.partial);
        bytes.extend_from_slice(chunk);

        let mut rest = bytes.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    self.buf.push_str(text);
                    break;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    self.buf.push_str(std::str::from_utf8(valid).unwrap_or(""));
                    match err.error_len() {
                        Some(len) => {
                            self.buf.push('\u{FFFD}');
                            rest = &after[len..];
                        }
                        None => {
                            self.partial = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Extract one full line from the buffer, stripping the newline and at
    /// most one trailing carriage return.
    fn take_line(&mut self) -> Option<String> {
        let idx = self.buf.find('\n')?;
        let mut line: String = self.buf.drain(..=idx).collect();
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
        Some(line)
    }
}

/// Parse one protocol record. Insignificant lines and undecodable payloads
/// yield `None` and are skipped without aborting the stream.
fn parse_line(line: &str) -> Option<StreamFrame> {
    let payload = line.strip_prefix(DATA_PREFIX)?.trim();
    if payload == DONE_SENTINEL {
        return Some(StreamFrame::Done);
    }
    match serde_json::from_str::<DeltaChunk>(payload) {
        Ok(chunk) => {
            let delta = chunk.choices.into_iter().next()?.delta.content?;
            if delta.is_empty() {
                None
            } else {
                Some(StreamFrame::Delta { delta })
            }
        }
        Err(err) => {
            tracing::debug!("skipping undecodable stream line: {}", err);
            None
        }
    }
}
