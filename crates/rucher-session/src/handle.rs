//! A cloneable handle for poking a running session from external code.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Cloneable handle exposing the opt-in abort hook.
///
/// Closing the widget does not abort the in-flight turn; this handle exists
/// for callers that want to bind cancellation to their own lifecycle.
#[derive(Clone, Default)]
pub struct SessionHandle {
    cancel: Arc<Mutex<CancellationToken>>,
}

impl SessionHandle {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Abort the in-flight turn, if any. The turn finalizes with whatever
    /// text has accumulated so far.
    pub fn abort(&self) {
        self.cancel.lock().cancel();
    }

    /// Install a fresh token for the next turn and return it.
    pub(crate) fn reset(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self.cancel.lock() = token.clone();
        token
    }
}
