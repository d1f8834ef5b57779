//! Transport seam between the turn controller and the wire client

use async_trait::async_trait;
use rucher_chat::{ChatClient, FrameStream, Message, Result};

/// Opens one streamed completion for a message window
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open the stream; `Err` means the request never produced a body
    async fn open(&self, window: Vec<Message>) -> Result<FrameStream>;
}

/// Direct HTTP transport over [`ChatClient`]
pub struct HttpTransport {
    client: ChatClient,
}

impl HttpTransport {
    /// Wrap a configured client
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn open(&self, window: Vec<Message>) -> Result<FrameStream> {
        self.client.stream(&window).await
    }
}
