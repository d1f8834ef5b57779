//! Turn controller: drives one request/response cycle against the store.

use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::broadcast;

use rucher_chat::{Error, Message, StreamFrame};

use crate::{
    events::SessionEvent, handle::SessionHandle, history::History, transport::Transport,
};

/// Reply substituted when the stream completes without producing content
pub const EMPTY_REPLY: &str = "Désolé, je n'ai pas pu générer de réponse. Réessayez ! 🐝";
/// Reply substituted when the turn fails before producing content
pub const ERROR_REPLY: &str = "Désolé, une erreur est survenue. Réessayez ! 🐝";

/// Lifecycle of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnStatus {
    /// No turn in flight
    #[default]
    Idle,
    /// Request sent, stream not yet open
    Sending,
    /// Deltas arriving
    Streaming,
}

/// Orchestrates turns: owns the store, opens the transport, folds deltas
/// into a single in-progress assistant message.
///
/// Only one turn runs at a time; sends arriving while a turn is in flight
/// are no-ops. All store mutations happen on the caller's task, so there
/// are no concurrent writers by construction.
pub struct ChatSession {
    transport: Arc<dyn Transport>,
    history: History,
    status: TurnStatus,
    error: Option<String>,
    event_tx: broadcast::Sender<SessionEvent>,
    handle: SessionHandle,
}

impl ChatSession {
    /// Create a session over a transport and a (possibly restored) store
    pub fn new(transport: Arc<dyn Transport>, history: History) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            transport,
            history,
            status: TurnStatus::Idle,
            error: None,
            event_tx,
            handle: SessionHandle::new(),
        }
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Current turn status
    pub fn status(&self) -> TurnStatus {
        self.status
    }

    /// Display string of the last failure; cleared on the next send
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The conversation store
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Cloneable handle exposing the opt-in abort hook
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Clear the conversation and any visible error
    pub fn clear(&mut self) {
        self.history.clear();
        self.error = None;
        self.emit(SessionEvent::Cleared);
    }

    /// Run one turn to completion.
    ///
    /// Whitespace-only input and sends while a turn is in flight are
    /// rejected without touching the store. Every accepted send ends back
    /// at [`TurnStatus::Idle`] with at least one assistant reply appended,
    /// even on failure.
    pub async fn send(&mut self, input: &str) {
        let text = input.trim();
        if text.is_empty() || self.status != TurnStatus::Idle {
            return;
        }

        self.error = None;
        self.status = TurnStatus::Sending;
        self.emit(SessionEvent::TurnStart);

        let user = Message::user(text);
        self.history.append(user.clone());
        self.emit(SessionEvent::UserMessage { message: user });

        let cancel = self.handle.reset();
        let window = self.history.window().to_vec();
        let mut accumulated = String::new();

        let mut frames = match self.transport.open(window).await {
            Ok(frames) => frames,
            Err(err) => {
                self.fail(display_error(&err), &accumulated);
                return;
            }
        };

        self.status = TurnStatus::Streaming;
        loop {
            let frame = tokio::select! {
                frame = frames.next() => frame,
                _ = cancel.cancelled() => None,
            };
            match frame {
                Some(StreamFrame::Delta { delta }) => {
                    accumulated.push_str(&delta);
                    self.history.replace_last(&accumulated);
                    self.emit(SessionEvent::AssistantUpdate {
                        content: accumulated.clone(),
                    });
                }
                Some(StreamFrame::Error { message }) => {
                    tracing::debug!("turn failed mid-stream: {}", message);
                    self.fail("Erreur de connexion".to_string(), &accumulated);
                    return;
                }
                Some(StreamFrame::Done) | None => break,
            }
        }

        self.finalize(accumulated);
    }

    /// The stream ended without error; substitute the fixed fallback when
    /// no content was produced.
    fn finalize(&mut self, accumulated: String) {
        let message = if accumulated.is_empty() {
            self.history.replace_last(EMPTY_REPLY);
            Message::assistant(EMPTY_REPLY)
        } else {
            Message::assistant(accumulated)
        };
        self.status = TurnStatus::Idle;
        self.emit(SessionEvent::TurnEnd { message });
    }

    /// The turn failed; surface the display string and make sure the user
    /// still sees a reply. Partial streamed text already in the store is
    /// kept as-is.
    fn fail(&mut self, display: String, accumulated: &str) {
        let reply = if accumulated.is_empty() {
            self.history.append(Message::assistant(ERROR_REPLY));
            Message::assistant(ERROR_REPLY)
        } else {
            Message::assistant(accumulated)
        };
        self.error = Some(display.clone());
        self.status = TurnStatus::Idle;
        self.emit(SessionEvent::Failed {
            message: display,
            reply,
        });
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.event_tx.send(event);
    }
}

/// Map a wire error to the banner string shown to the user
fn display_error(err: &Error) -> String {
    match err {
        Error::Endpoint { message, .. } => message.clone(),
        Error::Http(_) => "Erreur de connexion".to_string(),
        _ => "Erreur réseau".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use rucher_chat::{FrameStream, Result, Role};

    /// Transport replaying a fixed frame script, recording each window
    struct ScriptedTransport {
        frames: Vec<StreamFrame>,
        windows: Mutex<Vec<Vec<Message>>>,
    }

    impl ScriptedTransport {
        fn new(frames: Vec<StreamFrame>) -> Self {
            Self {
                frames,
                windows: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn open(&self, window: Vec<Message>) -> Result<FrameStream> {
            self.windows.lock().push(window);
            Ok(Box::pin(tokio_stream::iter(self.frames.clone())))
        }
    }

    /// Transport whose open always fails with an endpoint error
    struct FailingTransport;

    #[async_trait]
    impl Transport for FailingTransport {
        async fn open(&self, _window: Vec<Message>) -> Result<FrameStream> {
            Err(Error::Endpoint {
                status: 500,
                message: "Erreur 500".to_string(),
            })
        }
    }

    /// Transport whose stream never yields
    struct StalledTransport;

    #[async_trait]
    impl Transport for StalledTransport {
        async fn open(&self, _window: Vec<Message>) -> Result<FrameStream> {
            Ok(Box::pin(futures::stream::pending::<StreamFrame>()))
        }
    }

    fn delta(text: &str) -> StreamFrame {
        StreamFrame::Delta {
            delta: text.to_string(),
        }
    }

    fn session_with(frames: Vec<StreamFrame>) -> ChatSession {
        ChatSession::new(
            Arc::new(ScriptedTransport::new(frames)),
            History::ephemeral(),
        )
    }

    #[tokio::test]
    async fn test_deltas_fold_into_one_assistant_message() {
        let mut session = session_with(vec![
            delta("Les "),
            delta("abeilles "),
            delta("butinent."),
            StreamFrame::Done,
        ]);
        session.send("Parle-moi des abeilles").await;

        let messages = session.history().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, "Les abeilles butinent.");
        assert_eq!(session.status(), TurnStatus::Idle);
        assert!(session.error().is_none());
    }

    #[tokio::test]
    async fn test_empty_stream_substitutes_fallback_reply() {
        let mut session = session_with(vec![StreamFrame::Done]);
        session.send("bonjour").await;

        let messages = session.history().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, EMPTY_REPLY);
        assert_eq!(session.status(), TurnStatus::Idle);
        assert!(session.error().is_none());
    }

    #[tokio::test]
    async fn test_open_failure_appends_error_reply_and_sets_banner() {
        let mut session = ChatSession::new(Arc::new(FailingTransport), History::ephemeral());
        session.send("bonjour").await;

        let messages = session.history().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, ERROR_REPLY);
        assert_eq!(session.error(), Some("Erreur 500"));
        assert_eq!(session.status(), TurnStatus::Idle);
    }

    #[tokio::test]
    async fn test_mid_stream_error_keeps_partial_text() {
        let mut session = session_with(vec![
            delta("Début de réponse"),
            StreamFrame::Error {
                message: "connection reset".to_string(),
            },
        ]);
        session.send("bonjour").await;

        let messages = session.history().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, "Début de réponse");
        assert_eq!(session.error(), Some("Erreur de connexion"));
    }

    #[tokio::test]
    async fn test_mid_stream_error_without_content_appends_fallback() {
        let mut session = session_with(vec![StreamFrame::Error {
            message: "connection reset".to_string(),
        }]);
        session.send("bonjour").await;

        let messages = session.history().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, ERROR_REPLY);
        assert!(session.error().is_some());
    }

    #[tokio::test]
    async fn test_whitespace_only_input_is_rejected() {
        let mut session = session_with(vec![StreamFrame::Done]);
        session.send("   \n\t ").await;
        assert!(session.history().is_empty());
        assert_eq!(session.status(), TurnStatus::Idle);
    }

    #[tokio::test]
    async fn test_send_while_streaming_is_a_no_op() {
        let mut session = session_with(vec![StreamFrame::Done]);
        session.status = TurnStatus::Streaming;

        session.send("réentrant").await;
        assert!(session.history().is_empty());

        session.status = TurnStatus::Sending;
        session.send("réentrant").await;
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_window_is_capped_at_twelve() {
        let transport = Arc::new(ScriptedTransport::new(vec![StreamFrame::Done]));
        let mut history = History::ephemeral();
        for i in 0..20 {
            history.append(Message::user(format!("ancien {}", i)));
        }
        let mut session = ChatSession::new(transport.clone(), history);
        session.send("dernier").await;

        let windows = transport.windows.lock();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].len(), 12);
        assert_eq!(windows[0].last().unwrap().content, "dernier");
    }

    #[tokio::test]
    async fn test_clear_resets_store_and_error() {
        let mut session = ChatSession::new(Arc::new(FailingTransport), History::ephemeral());
        session.send("bonjour").await;
        assert!(session.error().is_some());

        session.clear();
        assert!(session.history().is_empty());
        assert!(session.error().is_none());
    }

    #[tokio::test]
    async fn test_events_are_broadcast_in_order() {
        let mut session = session_with(vec![delta("miel"), StreamFrame::Done]);
        let mut events = session.subscribe();
        session.send("bonjour").await;

        assert!(matches!(events.try_recv(), Ok(SessionEvent::TurnStart)));
        assert!(matches!(
            events.try_recv(),
            Ok(SessionEvent::UserMessage { .. })
        ));
        assert!(matches!(
            events.try_recv(),
            Ok(SessionEvent::AssistantUpdate { content }) if content == "miel"
        ));
        assert!(matches!(
            events.try_recv(),
            Ok(SessionEvent::TurnEnd { message }) if message.content == "miel"
        ));
    }

    #[tokio::test]
    async fn test_abort_finalizes_with_fallback_when_empty() {
        let session = ChatSession::new(Arc::new(StalledTransport), History::ephemeral());
        let handle = session.handle();

        let task = tokio::spawn(async move {
            let mut session = session;
            session.send("bonjour").await;
            session
        });
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        handle.abort();

        let session = task.await.unwrap();
        let messages = session.history().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, EMPTY_REPLY);
        assert_eq!(session.status(), TurnStatus::Idle);
    }
}
