//! rucher-chat: streaming client for the chat assistant endpoint
//!
//! This crate speaks the wire protocol of the site's hosted completion
//! proxy: a JSON POST carrying a bounded message window, answered by a
//! newline-delimited `data:` stream of content deltas.

pub mod client;
pub mod error;
pub mod sse;
pub mod stream;
pub mod types;

pub use client::ChatClient;
pub use error::{Error, Result};
pub use stream::{FrameStream, StreamFrame};
pub use types::{Message, Role};
