//! Thread reconciliation.
//!
//! Produces the authoritative message list for the currently selected
//! peer by merging a point-in-time history snapshot with live pushes.
//! The state machine is synchronous; the async orchestration around it
//! lives in [`crate::client`].
//!
//! Invariants maintained here:
//! - only messages of the active conversation are ever held;
//! - no two entries share a message id;
//! - after the snapshot merge, entries are ordered by `created_at`
//!   (message id breaking ties), and live appends preserve arrival order.

use std::collections::HashSet;

use tracing::debug;

use parley_shared::{Identity, Message, MessageId, ThreadKey, UserId};

/// What became of an inbound push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Appended to the loaded thread.
    Appended,
    /// Held until the outstanding history snapshot arrives.
    Buffered,
    /// Addressed to a conversation other than the active one; dropped.
    OtherThread,
    /// An id already present; dropped.
    Duplicate,
}

#[derive(Debug)]
enum LoadState {
    /// History fetch outstanding. Pushes for the active conversation
    /// accumulate here instead of being dropped.
    Loading { buffered: Vec<Message> },
    Loaded,
}

#[derive(Debug)]
struct ActiveThread {
    peer: Identity,
    messages: Vec<Message>,
    seen: HashSet<MessageId>,
    load: LoadState,
}

/// Reconciler state for the single active thread.
///
/// Selecting a peer discards the previous thread wholesale; there is no
/// cache of previously viewed conversations.
#[derive(Debug, Default)]
pub struct ThreadState {
    active: Option<ActiveThread>,
}

impl ThreadState {
    /// Replace the active thread with an empty, loading one bound to
    /// `peer`. The caller is expected to issue the history fetch next.
    pub fn select_peer(&mut self, peer: Identity) {
        debug!(peer = %peer.id, "peer selected, thread reset");
        self.active = Some(ActiveThread {
            peer,
            messages: Vec::new(),
            seen: HashSet::new(),
            load: LoadState::Loading {
                buffered: Vec::new(),
            },
        });
    }

    /// Clear the active thread. A fetch still in flight for the old peer
    /// will be discarded when it completes.
    pub fn deselect(&mut self) {
        self.active = None;
    }

    pub fn selected_peer(&self) -> Option<&Identity> {
        self.active.as_ref().map(|t| &t.peer)
    }

    pub fn selected_peer_id(&self) -> Option<&UserId> {
        self.active.as_ref().map(|t| &t.peer.id)
    }

    /// Whether the active thread is still waiting for its snapshot.
    pub fn is_loading(&self) -> bool {
        matches!(
            self.active,
            Some(ActiveThread {
                load: LoadState::Loading { .. },
                ..
            })
        )
    }

    /// The reconciled messages of the active thread.
    pub fn messages(&self) -> &[Message] {
        self.active.as_ref().map(|t| t.messages.as_slice()).unwrap_or(&[])
    }

    /// Merge a history snapshot into the thread it was fetched for.
    ///
    /// Returns `false` (and changes nothing) when `peer_id` no longer
    /// matches the active selection: a slower fetch for a deselected
    /// peer is stale and must not clobber the current thread.
    ///
    /// The merge is a union by message id of the snapshot and any pushes
    /// buffered while the fetch was outstanding, ordered by `created_at`
    /// with the id as tie-break.
    pub fn history_fetched(&mut self, peer_id: &UserId, snapshot: Vec<Message>) -> bool {
        let Some(thread) = self.active.as_mut() else {
            debug!(peer = %peer_id, "history snapshot with no active thread, discarded");
            return false;
        };
        if &thread.peer.id != peer_id {
            debug!(
                fetched_for = %peer_id,
                active = %thread.peer.id,
                "stale history snapshot discarded"
            );
            return false;
        }

        let buffered = match std::mem::replace(&mut thread.load, LoadState::Loaded) {
            LoadState::Loading { buffered } => buffered,
            LoadState::Loaded => Vec::new(),
        };

        for message in snapshot.into_iter().chain(buffered) {
            if thread.seen.insert(message.id.clone()) {
                thread.messages.push(message);
            }
        }
        thread.messages.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        debug!(peer = %peer_id, count = thread.messages.len(), "thread loaded");
        true
    }

    /// Route one inbound push.
    ///
    /// A push participates in the active thread iff its conversation key
    /// equals `{local_id, selected peer}`; everything else is dropped on
    /// the spot. The sender's own echoes satisfy the same predicate and
    /// need no special casing.
    pub fn inbound_push(&mut self, local_id: &UserId, message: Message) -> PushOutcome {
        let Some(thread) = self.active.as_mut() else {
            return PushOutcome::OtherThread;
        };

        let active_key = ThreadKey::new(local_id.clone(), thread.peer.id.clone());
        if message.thread_key() != active_key {
            return PushOutcome::OtherThread;
        }

        match &mut thread.load {
            LoadState::Loading { buffered } => {
                if buffered.iter().any(|m| m.id == message.id) {
                    return PushOutcome::Duplicate;
                }
                buffered.push(message);
                PushOutcome::Buffered
            }
            LoadState::Loaded => {
                if !thread.seen.insert(message.id.clone()) {
                    return PushOutcome::Duplicate;
                }
                thread.messages.push(message);
                PushOutcome::Appended
            }
        }
    }
}
