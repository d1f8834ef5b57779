//! Streaming frame types

use serde::{Deserialize, Serialize};
use std::pin::Pin;
use tokio_stream::Stream;

/// One decoded unit of the completion stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamFrame {
    /// Incremental assistant text
    Delta { delta: String },
    /// The stream has produced everything it will produce
    Done,
    /// Transport failure after the stream was opened
    Error { message: String },
}

impl StreamFrame {
    /// Check if this frame ends the stream (Done or Error)
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamFrame::Done | StreamFrame::Error { .. })
    }
}

/// A stream of decoded frames
pub type FrameStream = Pin<Box<dyn Stream<Item = StreamFrame> + Send>>;
