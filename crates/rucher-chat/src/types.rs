//! Message types shared between the conversation store and the wire

use serde::{Deserialize, Serialize};

/// Message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of the conversation.
///
/// This is both the stored form and the outbound wire shape; the snapshot
/// file and the request body serialize it identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Check if this message was authored by the assistant
    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

/// Outbound request body
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub messages: &'a [Message],
}

// Streaming response types

#[derive(Debug, Deserialize)]
pub(crate) struct DeltaChunk {
    #[serde(default)]
    pub choices: Vec<DeltaChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeltaChoice {
    #[serde(default)]
    pub delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Delta {
    pub content: Option<String>,
}

/// Best-effort error payload on failure responses
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_roles_serialize_lowercase() {
        let json = serde_json::to_string(&Message::user("bonjour")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"bonjour"}"#);
        let json = serde_json::to_string(&Message::assistant("salut")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"salut"}"#);
    }

    #[test]
    fn test_request_body_shape() {
        let window = vec![Message::user("a"), Message::assistant("b")];
        let json = serde_json::to_value(ChatRequest { messages: &window }).unwrap();
        assert_eq!(json["messages"].as_array().unwrap().len(), 2);
        assert_eq!(json["messages"][1]["role"], "assistant");
    }

    #[test]
    fn test_delta_chunk_tolerates_missing_fields() {
        let chunk: DeltaChunk = serde_json::from_str(r#"{"choices":[{"finish_reason":"stop"}]}"#).unwrap();
        assert!(chunk.choices[0].delta.content.is_none());

        let chunk: DeltaChunk = serde_json::from_str("{}").unwrap();
        assert!(chunk.choices.is_empty());
    }
}
