//! Mutable client state shared between the caller-facing API and the
//! inbound bridge task.

use parley_shared::Identity;

use crate::thread::ThreadState;

/// Central client state, wrapped in `Arc<Mutex<..>>`.
///
/// The inbound bridge reads the current peer selection from here at
/// every dispatch, so a push handler registered once per connection
/// always observes the selection as it is now.
pub struct ClientState {
    /// The resolved local identity. `None` while the session is
    /// unresolved; replaced wholesale on re-login, never mutated
    /// field-by-field.
    pub identity: Option<Identity>,

    /// Reconciler for the active thread.
    pub thread: ThreadState,
}

impl ClientState {
    pub fn new() -> Self {
        Self {
            identity: None,
            thread: ThreadState::default(),
        }
    }
}

impl Default for ClientState {
    fn default() -> Self {
        Self::new()
    }
}
