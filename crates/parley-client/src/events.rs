//! Events emitted to the presentation layer.

use parley_shared::{Message, UserId};

/// Events the surface consumes to keep the rendered conversation in
/// sync with the reconciled state.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// A push passed reconciliation and was appended to the active
    /// thread.
    MessageAppended(Message),

    /// The active thread finished merging its history snapshot.
    ThreadLoaded {
        peer_id: UserId,
        message_count: usize,
    },

    /// The realtime connection ended, by request or by failure.
    ConnectionClosed { reason: String },
}
