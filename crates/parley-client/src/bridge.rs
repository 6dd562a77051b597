//! Inbound push bridge.
//!
//! One long-lived task per connection forwards pushes from the
//! notification channel into the reconciler. The peer selection is read
//! from the shared state at each dispatch: the handler is registered
//! once per connection while the selection changes far more often, so
//! capturing the selection at bind time would pin it to a stale value.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use parley_net::ConnectionNotification;

use crate::events::ClientEvent;
use crate::state::ClientState;
use crate::thread::PushOutcome;

pub(crate) fn spawn_bridge(
    state: Arc<Mutex<ClientState>>,
    mut notif_rx: mpsc::Receiver<ConnectionNotification>,
    events_tx: mpsc::Sender<ClientEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(notification) = notif_rx.recv().await {
            match notification {
                ConnectionNotification::MessageReceived(message) => {
                    // Reconcile under the lock, emit after releasing it.
                    let outcome = {
                        let Ok(mut guard) = state.lock() else {
                            warn!("client state lock poisoned, dropping push");
                            continue;
                        };
                        let Some(local_id) = guard.identity.as_ref().map(|i| i.id.clone()) else {
                            debug!(msg = %message.id, "push before identity resolution, dropped");
                            continue;
                        };
                        guard.thread.inbound_push(&local_id, message.clone())
                    };

                    match outcome {
                        PushOutcome::Appended => {
                            let _ = events_tx.send(ClientEvent::MessageAppended(message)).await;
                        }
                        PushOutcome::Buffered => {
                            debug!(msg = %message.id, "push buffered behind history fetch");
                        }
                        PushOutcome::OtherThread => {
                            debug!(msg = %message.id, "push for another conversation, dropped");
                        }
                        PushOutcome::Duplicate => {
                            debug!(msg = %message.id, "duplicate push, dropped");
                        }
                    }
                }
                ConnectionNotification::Closed { reason } => {
                    let _ = events_tx
                        .send(ClientEvent::ConnectionClosed { reason })
                        .await;
                }
            }
        }
        debug!("inbound bridge terminated");
    })
}
