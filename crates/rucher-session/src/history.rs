//! Conversation store: ordered message log with write-through persistence.

use rucher_chat::Message;
use std::fs;
use std::path::PathBuf;

/// Maximum number of messages sent to the endpoint per turn
pub const WINDOW_SIZE: usize = 12;

/// Ordered conversation log, optionally backed by a single snapshot file.
///
/// Every mutation rewrites the snapshot; the slot is last-writer-wins and
/// persistence failures never surface to callers.
pub struct History {
    messages: Vec<Message>,
    slot: Option<PathBuf>,
}

impl History {
    /// In-memory store with no snapshot file
    pub fn ephemeral() -> Self {
        Self {
            messages: Vec::new(),
            slot: None,
        }
    }

    /// Store backed by `path`, restoring the prior snapshot when readable.
    ///
    /// A missing or corrupt snapshot yields an empty conversation; restore
    /// never fails.
    pub fn restore(path: PathBuf) -> Self {
        let messages = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(messages) => messages,
                Err(err) => {
                    tracing::warn!("discarding corrupt history snapshot: {}", err);
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };
        Self {
            messages,
            slot: Some(path),
        }
    }

    /// All messages, oldest first
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages in the conversation
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the conversation is empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Trailing window sent to the endpoint, most-recent-last
    pub fn window(&self) -> &[Message] {
        let start = self.messages.len().saturating_sub(WINDOW_SIZE);
        &self.messages[start..]
    }

    /// Append a message and persist
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
        self.persist();
    }

    /// Overwrite the last message when it is an assistant message, else
    /// append a new assistant message. Persists either way.
    ///
    /// Streaming deltas go through here so one turn mutates exactly one
    /// assistant entry in place.
    pub fn replace_last(&mut self, content: &str) {
        match self.messages.last_mut() {
            Some(last) if last.is_assistant() => last.content = content.to_string(),
            _ => self.messages.push(Message::assistant(content)),
        }
        self.persist();
    }

    /// Empty the conversation and persist the empty state
    pub fn clear(&mut self) {
        self.messages.clear();
        self.persist();
    }

    /// Write-through snapshot; failures are logged and swallowed.
    fn persist(&self) {
        let Some(path) = &self.slot else { return };
        let result = serde_json::to_string(&self.messages)
            .map_err(std::io::Error::other)
            .and_then(|json| {
                if let Some(dir) = path.parent() {
                    fs::create_dir_all(dir)?;
                }
                fs::write(path, json)
            });
        if let Err(err) = result {
            tracing::warn!("failed to persist chat history: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(n: usize) -> History {
        let mut history = History::ephemeral();
        for i in 0..n {
            history.append(Message::user(format!("message {}", i)));
        }
        history
    }

    #[test]
    fn test_window_returns_min_of_len_and_cap() {
        assert_eq!(filled(3).window().len(), 3);
        assert_eq!(filled(12).window().len(), 12);
        assert_eq!(filled(30).window().len(), 12);
        assert!(filled(0).window().is_empty());
    }

    #[test]
    fn test_window_keeps_most_recent_in_order() {
        let history = filled(15);
        let window = history.window();
        assert_eq!(window.first().unwrap().content, "message 3");
        assert_eq!(window.last().unwrap().content, "message 14");
    }

    #[test]
    fn test_replace_last_overwrites_assistant_tail() {
        let mut history = History::ephemeral();
        history.append(Message::user("question"));
        history.replace_last("partial");
        history.replace_last("partial answer");

        assert_eq!(history.len(), 2);
        assert_eq!(history.messages()[1].content, "partial answer");
        assert!(history.messages()[1].is_assistant());
    }

    #[test]
    fn test_replace_last_appends_when_tail_is_user() {
        let mut history = History::ephemeral();
        history.append(Message::user("question"));
        history.replace_last("answer");
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_replace_last_on_empty_appends() {
        let mut history = History::ephemeral();
        history.replace_last("answer");
        assert_eq!(history.len(), 1);
        assert!(history.messages()[0].is_assistant());
    }

    #[test]
    fn test_clear_empties_the_log() {
        let mut history = filled(4);
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let mut history = History::restore(path.clone());
        history.append(Message::user("a"));
        history.append(Message::assistant("b"));
        history.append(Message::user("c"));

        let restored = History::restore(path);
        assert_eq!(restored.messages(), history.messages());
        assert_eq!(restored.len(), 3);
    }

    #[test]
    fn test_restore_missing_file_yields_empty() {
        let dir = tempfile::tempdir().unwrap();
        let history = History::restore(dir.path().join("absent.json"));
        assert!(history.is_empty());
    }

    #[test]
    fn test_restore_corrupt_snapshot_yields_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{definitely not an array").unwrap();

        let history = History::restore(path);
        assert!(history.is_empty());
    }

    #[test]
    fn test_clear_persists_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let mut history = History::restore(path.clone());
        history.append(Message::user("a"));
        history.clear();

        assert!(History::restore(path).is_empty());
    }
}
