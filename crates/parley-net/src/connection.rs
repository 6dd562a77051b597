//! Connection lifecycle with the tokio mpsc command/notification pattern.
//!
//! The WebSocket event loop runs in a dedicated tokio task. External code
//! communicates with it through typed command and notification channels
//! and observes the lifecycle state through a `watch` channel, keeping
//! the networking layer fully asynchronous and decoupled.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use tracing::{debug, error, info, warn};

use parley_shared::constants::{COMMAND_CHANNEL_CAPACITY, NOTIFICATION_CHANNEL_CAPACITY};
use parley_shared::{ClientFrame, OutboundMessage, ServerFrame, UserId};

use crate::error::NetError;

// ---------------------------------------------------------------------------
// Command / notification / state types
// ---------------------------------------------------------------------------

/// Commands sent *into* the connection task.
#[derive(Debug)]
pub enum ConnectionCommand {
    /// Transmit an outbound direct message.
    SendMessage(OutboundMessage),
    /// Gracefully close the connection.
    Shutdown,
}

/// Notifications sent *from* the connection task to the application.
#[derive(Debug, Clone)]
pub enum ConnectionNotification {
    /// A message push arrived for the registered identity.
    MessageReceived(parley_shared::Message),
    /// The connection ended, by request or by failure.
    Closed { reason: String },
}

/// Lifecycle state of the connection bound to one identity.
///
/// `Registered` is the only state in which outbound sends are accepted
/// and inbound pushes are guaranteed to be routed to this identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    Disconnected,
    Connecting,
    Connected,
    Registered,
}

/// Configuration for spawning a connection.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// WebSocket endpoint, e.g. `ws://localhost:8080/ws`.
    pub ws_url: String,
    /// Bound on the connect handshake; exceeding it surfaces as
    /// [`NetError::Timeout`].
    pub connect_timeout: Duration,
    /// Capacity of the command channel.
    pub command_capacity: usize,
    /// Capacity of the notification channel.
    pub notification_capacity: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            ws_url: parley_shared::constants::DEFAULT_WS_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            command_capacity: COMMAND_CHANNEL_CAPACITY,
            notification_capacity: NOTIFICATION_CHANNEL_CAPACITY,
        }
    }
}

/// Handle to a spawned connection task.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    cmd_tx: mpsc::Sender<ConnectionCommand>,
    state_rx: watch::Receiver<ConnState>,
}

impl ConnectionHandle {
    /// Current lifecycle state.
    pub fn state(&self) -> ConnState {
        *self.state_rx.borrow()
    }

    /// A watcher for lifecycle state transitions.
    pub fn watch_state(&self) -> watch::Receiver<ConnState> {
        self.state_rx.clone()
    }

    /// Transmit an outbound message.
    ///
    /// Success means "accepted by the transport layer", nothing more:
    /// there is no delivery or storage acknowledgment. Fails with
    /// [`NetError::NotConnected`] unless the connection is `Registered`.
    pub async fn send(&self, message: OutboundMessage) -> Result<(), NetError> {
        if self.state() != ConnState::Registered {
            return Err(NetError::NotConnected);
        }
        self.cmd_tx
            .send(ConnectionCommand::SendMessage(message))
            .await
            .map_err(|_| NetError::Closed)
    }

    /// Close the connection and wait for the task to finish tearing
    /// down. Idempotent: shutting down an already-dead connection is a
    /// no-op.
    pub async fn shutdown(&self) {
        let _ = self.cmd_tx.send(ConnectionCommand::Shutdown).await;
        let mut state_rx = self.state_rx.clone();
        let _ = state_rx
            .wait_for(|state| *state == ConnState::Disconnected)
            .await;
    }
}

/// Open a WebSocket to the server, register `user_id` on it, and spawn
/// the event loop in a background tokio task.
///
/// The returned handle only exists in the `Registered` state: a failed
/// attempt surfaces as an error (`Timeout` or `Transport`) with nothing
/// left running, never as a half-open connection. No automatic retry is
/// performed.
///
/// # Returns
///
/// `(handle, notification_rx)`
pub async fn spawn_connection(
    user_id: UserId,
    config: ConnectionConfig,
) -> Result<(ConnectionHandle, mpsc::Receiver<ConnectionNotification>), NetError> {
    let (state_tx, state_rx) = watch::channel(ConnState::Connecting);

    info!(user = %user_id, url = %config.ws_url, "opening connection");

    let ws = match tokio::time::timeout(
        config.connect_timeout,
        connect_async(config.ws_url.as_str()),
    )
    .await
    {
        Err(_) => {
            warn!(url = %config.ws_url, "connection attempt timed out");
            return Err(NetError::Timeout);
        }
        Ok(Err(e)) => {
            warn!(url = %config.ws_url, error = %e, "connection attempt failed");
            return Err(e.into());
        }
        Ok(Ok((ws, _response))) => ws,
    };

    state_tx.send_replace(ConnState::Connected);

    let (mut sink, mut stream) = ws.split();

    // Announce the identity before anything else; the server routes
    // pushes only to registered connections.
    let register = ClientFrame::Register {
        user_id: user_id.clone(),
    }
    .to_json()?;
    sink.send(WsMessage::Text(register.into())).await?;

    state_tx.send_replace(ConnState::Registered);
    info!(user = %user_id, "connection registered");

    let (cmd_tx, mut cmd_rx) = mpsc::channel::<ConnectionCommand>(config.command_capacity);
    let (notif_tx, notif_rx) =
        mpsc::channel::<ConnectionNotification>(config.notification_capacity);

    // Spawn the event loop
    tokio::spawn(async move {
        loop {
            tokio::select! {
                // --- Incoming commands ---
                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(ConnectionCommand::SendMessage(outbound)) => {
                            let frame = match ClientFrame::Dm(outbound).to_json() {
                                Ok(json) => json,
                                Err(e) => {
                                    error!(error = %e, "failed to encode outbound frame");
                                    continue;
                                }
                            };
                            if let Err(e) = sink.send(WsMessage::Text(frame.into())).await {
                                error!(error = %e, "outbound send failed");
                                let _ = notif_tx
                                    .send(ConnectionNotification::Closed {
                                        reason: e.to_string(),
                                    })
                                    .await;
                                break;
                            }
                        }
                        Some(ConnectionCommand::Shutdown) => {
                            info!("connection shutdown requested");
                            let _ = sink.close().await;
                            break;
                        }
                        None => {
                            // All senders dropped
                            info!("command channel closed, shutting down connection");
                            let _ = sink.close().await;
                            break;
                        }
                    }
                }

                // --- Inbound frames ---
                incoming = stream.next() => {
                    match incoming {
                        Some(Ok(WsMessage::Text(text))) => {
                            match ServerFrame::from_json(text.as_str()) {
                                Ok(ServerFrame::Dm(message)) => {
                                    debug!(msg = %message.id, from = %message.from_user_id, "push received");
                                    let _ = notif_tx
                                        .send(ConnectionNotification::MessageReceived(message))
                                        .await;
                                }
                                Err(e) => {
                                    debug!(error = %e, "ignoring undecodable frame");
                                }
                            }
                        }
                        Some(Ok(WsMessage::Close(_))) | None => {
                            info!("server closed the connection");
                            let _ = notif_tx
                                .send(ConnectionNotification::Closed {
                                    reason: "server closed the connection".to_string(),
                                })
                                .await;
                            break;
                        }
                        Some(Ok(_)) => {
                            // Ping/pong and binary frames carry no protocol data
                        }
                        Some(Err(e)) => {
                            warn!(error = %e, "transport error on inbound stream");
                            let _ = notif_tx
                                .send(ConnectionNotification::Closed {
                                    reason: e.to_string(),
                                })
                                .await;
                            break;
                        }
                    }
                }
            }
        }

        state_tx.send_replace(ConnState::Disconnected);
        info!("connection event loop terminated");
    });

    Ok((ConnectionHandle { cmd_tx, state_rx }, notif_rx))
}
