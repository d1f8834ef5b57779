//! HTTP client for the hosted chat completion endpoint

use async_stream::stream;
use futures::StreamExt;
use tokio_stream::Stream;

use crate::{
    error::{Error, Result},
    sse::SseDecoder,
    stream::{FrameStream, StreamFrame},
    types::{ChatRequest, ErrorBody, Message},
};

/// Environment variable naming the chat endpoint URL
pub const ENDPOINT_ENV: &str = "RUCHER_CHAT_URL";
/// Environment variable naming the bearer credential
pub const API_KEY_ENV: &str = "RUCHER_CHAT_KEY";

/// Client for the site's chat completion proxy
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl ChatClient {
    /// Create a client for an endpoint with a bearer credential
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let endpoint =
            std::env::var(ENDPOINT_ENV).map_err(|_| Error::MissingConfig(ENDPOINT_ENV))?;
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| Error::MissingConfig(API_KEY_ENV))?;
        Ok(Self::new(endpoint, api_key))
    }

    /// POST the message window and decode the streamed reply.
    ///
    /// Returns `Err` when the request cannot be opened or the endpoint
    /// answers with a failure status. Failures after the stream is open are
    /// reported in-band as [`StreamFrame::Error`].
    pub async fn stream(&self, window: &[Message]) -> Result<FrameStream> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .bearer_auth(&self.api_key)
            .json(&ChatRequest { messages: window })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Endpoint {
                status: status.as_u16(),
                message: failure_message(status.as_u16(), &body),
            });
        }

        Ok(decode_stream(response.bytes_stream()))
    }
}

/// Adapt a raw byte-chunk stream into decoded frames.
///
/// Always ends with a terminal frame: `Done` on sentinel or EOF, `Error`
/// on a transport failure.
fn decode_stream<S, B, E>(byte_stream: S) -> FrameStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    Box::pin(stream! {
        let mut byte_stream = Box::pin(byte_stream);
        let mut decoder = SseDecoder::new();
        while let Some(chunk) = byte_stream.next().await {
            match chunk {
                Ok(bytes) => {
                    for frame in decoder.feed(bytes.as_ref()) {
                        let terminal = frame.is_terminal();
                        yield frame;
                        if terminal {
                            return;
                        }
                    }
                }
                Err(err) => {
                    tracing::debug!("chat stream transport error: {}", err);
                    yield StreamFrame::Error { message: err.to_string() };
                    return;
                }
            }
        }
        yield StreamFrame::Done;
    })
}

/// Extract the display message from a failure body, falling back to the
/// status code when the payload is not the expected `{"error": ...}` shape.
fn failure_message(status: u16, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_else(|| format!("Erreur {}", status))
}

#[cfg(test)]
mod tests {
    use super::*;

    type ChunkResult = std::result::Result<Vec<u8>, std::io::Error>;

    async fn collect(frames: FrameStream) -> Vec<StreamFrame> {
        let mut frames = frames;
        let mut out = Vec::new();
        while let Some(frame) = frames.next().await {
            out.push(frame);
        }
        out
    }

    #[tokio::test]
    async fn test_decode_stream_merges_split_chunks() {
        let line = "data: {\"choices\":[{\"delta\":{\"content\":\"déjà vu\"}}]}\n";
        let bytes = line.as_bytes();
        // Split inside the 'é'
        let split = line.find('é').unwrap() + 1;
        let chunks: Vec<ChunkResult> =
            vec![Ok(bytes[..split].to_vec()), Ok(bytes[split..].to_vec())];

        let frames = collect(decode_stream(tokio_stream::iter(chunks))).await;
        assert_eq!(
            frames,
            vec![
                StreamFrame::Delta { delta: "déjà vu".into() },
                StreamFrame::Done
            ]
        );
    }

    #[tokio::test]
    async fn test_decode_stream_eof_without_sentinel_yields_done() {
        let chunks: Vec<ChunkResult> = vec![];
        let frames = collect(decode_stream(tokio_stream::iter(chunks))).await;
        assert_eq!(frames, vec![StreamFrame::Done]);
    }

    #[tokio::test]
    async fn test_decode_stream_stops_at_sentinel() {
        let chunks: Vec<ChunkResult> = vec![
            Ok(b"data: [DONE]\n".to_vec()),
            Ok(b"data: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n".to_vec()),
        ];
        let frames = collect(decode_stream(tokio_stream::iter(chunks))).await;
        assert_eq!(frames, vec![StreamFrame::Done]);
    }

    #[tokio::test]
    async fn test_decode_stream_surfaces_transport_error() {
        let chunks: Vec<ChunkResult> = vec![
            Ok(b"data: {\"choices\":[{\"delta\":{\"content\":\"un\"}}]}\n".to_vec()),
            Err(std::io::Error::other("connection reset")),
        ];
        let frames = collect(decode_stream(tokio_stream::iter(chunks))).await;
        assert_eq!(frames.len(), 2);
        assert!(matches!(&frames[0], StreamFrame::Delta { delta } if delta == "un"));
        assert!(matches!(&frames[1], StreamFrame::Error { .. }));
    }

    #[test]
    fn test_failure_message_from_error_payload() {
        assert_eq!(
            failure_message(429, r#"{"error":"Trop de requêtes"}"#),
            "Trop de requêtes"
        );
    }

    #[test]
    fn test_failure_message_without_error_field() {
        assert_eq!(failure_message(500, r#"{"detail":"boom"}"#), "Erreur 500");
    }

    #[test]
    fn test_failure_message_from_unparseable_body() {
        assert_eq!(failure_message(502, "<html>Bad Gateway</html>"), "Erreur 502");
        assert_eq!(failure_message(503, ""), "Erreur 503");
    }
}
