//! Session event types

use rucher_chat::Message;
use serde::{Deserialize, Serialize};

/// Events emitted while a turn progresses.
///
/// Subscribers mirror the store from these; the presentation layer is one
/// subscriber among possibly several.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A send was accepted; loading begins
    TurnStart,

    /// The user message was appended to the store
    UserMessage { message: Message },

    /// The in-progress assistant message changed; carries the full
    /// accumulated text, not the delta
    AssistantUpdate { content: String },

    /// The turn finalized; `message` is the assistant entry as stored
    TurnEnd { message: Message },

    /// The turn failed; `message` is the display string for the banner and
    /// `reply` is the assistant entry left in the store (partial streamed
    /// text, or the fixed fallback)
    Failed { message: String, reply: Message },

    /// The conversation was cleared
    Cleared,
}

impl SessionEvent {
    /// Check if this event ends a turn
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionEvent::TurnEnd { .. } | SessionEvent::Failed { .. }
        )
    }
}
