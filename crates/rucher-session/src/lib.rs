//! rucher-session: conversation state and turn orchestration
//!
//! This crate owns the persisted message log and drives one
//! request/response cycle at a time against the chat endpoint.

pub mod events;
pub mod handle;
pub mod history;
pub mod session;
pub mod transport;

pub use events::SessionEvent;
pub use handle::SessionHandle;
pub use history::{History, WINDOW_SIZE};
pub use session::{ChatSession, TurnStatus, EMPTY_REPLY, ERROR_REPLY};
pub use transport::{HttpTransport, Transport};
