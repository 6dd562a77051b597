//! The client orchestrator.
//!
//! [`ChatClient`] wires the session, the realtime connection, and the
//! thread reconciler together and is the single entry point for a
//! presentation layer.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;
use url::Url;

use parley_api::{ApiClient, ExternalProvider};
use parley_net::{spawn_connection, ConnState, ConnectionConfig, ConnectionHandle};
use parley_shared::constants::EVENT_CHANNEL_CAPACITY;
use parley_shared::{Identity, Message, UserId};
use parley_store::Database;

use crate::bridge::spawn_bridge;
use crate::compose;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::events::ClientEvent;
use crate::session::Session;
use crate::state::ClientState;

/// A live realtime connection and the bridge task feeding its pushes
/// into the reconciler.
struct ConnectionBinding {
    handle: ConnectionHandle,
    bridge: JoinHandle<()>,
    bound_to: UserId,
}

/// The messaging client core.
///
/// Construction hands back the [`ClientEvent`] receiver; everything else
/// is driven through the methods below.
pub struct ChatClient {
    config: ClientConfig,
    api: Arc<ApiClient>,
    session: Session,
    state: Arc<Mutex<ClientState>>,
    events_tx: mpsc::Sender<ClientEvent>,
    binding: Option<ConnectionBinding>,
}

impl ChatClient {
    pub fn new(config: ClientConfig) -> Result<(Self, mpsc::Receiver<ClientEvent>), ClientError> {
        let api = Arc::new(ApiClient::new(&config.api_base)?);
        let store = match &config.db_path {
            Some(path) => Database::open_at(path)?,
            None => Database::new()?,
        };
        let session = Session::new(api.clone(), store);
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let client = Self {
            config,
            api,
            session,
            state: Arc::new(Mutex::new(ClientState::new())),
            events_tx,
            binding: None,
        };
        Ok((client, events_rx))
    }

    /// Run the startup protocol: URL token first, then the stored
    /// credential. If an identity resolves, the connection is bound to
    /// it. Returns the sanitized URL (when one was given) for the
    /// surface to swap into the address bar.
    pub async fn bootstrap(
        &mut self,
        current_url: Option<&str>,
    ) -> Result<Option<String>, ClientError> {
        let (identity, sanitized) = self.session.bootstrap(current_url).await?;
        if let Some(identity) = identity {
            self.bind(identity).await?;
        }
        Ok(sanitized)
    }

    /// Resolve an identity by email lookup and bind the connection to it.
    pub async fn login_by_email(&mut self, email: &str) -> Result<Identity, ClientError> {
        let identity = self.session.login_by_email(email).await?;
        self.bind(identity.clone()).await?;
        Ok(identity)
    }

    /// The redirect URL for an external identity provider; the provider
    /// returns control via the URL-token bootstrap path.
    pub fn external_login_url(&self, provider: ExternalProvider) -> Result<Url, ClientError> {
        self.session.external_login_url(provider)
    }

    /// Clear the identity and the persisted credential, and tear the
    /// connection down.
    pub async fn logout(&mut self) -> Result<(), ClientError> {
        self.unbind().await;
        self.session.logout()?;

        let mut guard = self.state.lock().map_err(|_| ClientError::LockPoisoned)?;
        guard.identity = None;
        guard.thread.deselect();
        Ok(())
    }

    /// Bind the realtime connection to a freshly resolved identity.
    ///
    /// At most one connection exists at a time: rebinding is a strict
    /// tear-down-then-build sequence, never both at once.
    async fn bind(&mut self, identity: Identity) -> Result<(), ClientError> {
        if let Some(binding) = &self.binding {
            if binding.bound_to != identity.id {
                info!(
                    old = %binding.bound_to,
                    new = %identity.id,
                    "rebinding connection to a new identity"
                );
            }
        }
        self.unbind().await;

        // The identity must be visible to the bridge before the first
        // push can arrive.
        {
            let mut guard = self.state.lock().map_err(|_| ClientError::LockPoisoned)?;
            guard.identity = Some(identity.clone());
            guard.thread.deselect();
        }

        let conn_config = ConnectionConfig {
            ws_url: self.config.ws_url.clone(),
            ..ConnectionConfig::default()
        };
        let (handle, notif_rx) = spawn_connection(identity.id.clone(), conn_config).await?;
        let bridge = spawn_bridge(self.state.clone(), notif_rx, self.events_tx.clone());

        self.binding = Some(ConnectionBinding {
            handle,
            bridge,
            bound_to: identity.id,
        });
        Ok(())
    }

    /// Tear down the connection, the bridge, and all per-connection
    /// state. Idempotent.
    pub async fn unbind(&mut self) {
        if let Some(binding) = self.binding.take() {
            binding.handle.shutdown().await;
            // The connection task has exited, so the notification channel
            // is closed and the bridge drains to completion.
            let _ = binding.bridge.await;
        }
    }

    /// Select a peer: reset the thread, fetch the history snapshot, and
    /// merge it with any pushes that arrive while the fetch is in
    /// flight. A snapshot that resolves after the selection moved on is
    /// discarded silently.
    pub async fn select_peer(&self, peer: Identity) -> Result<(), ClientError> {
        let local_id = {
            let mut guard = self.state.lock().map_err(|_| ClientError::LockPoisoned)?;
            let Some(identity) = guard.identity.as_ref() else {
                return Err(ClientError::NotConnected);
            };
            let local_id = identity.id.clone();
            guard.thread.select_peer(peer.clone());
            local_id
        };

        let peer_id = peer.id;
        let snapshot = self.api.fetch_history(&local_id, &peer_id).await?;

        let loaded = {
            let mut guard = self.state.lock().map_err(|_| ClientError::LockPoisoned)?;
            if guard.thread.history_fetched(&peer_id, snapshot) {
                Some(guard.thread.messages().len())
            } else {
                None
            }
        };

        if let Some(message_count) = loaded {
            let _ = self
                .events_tx
                .send(ClientEvent::ThreadLoaded {
                    peer_id,
                    message_count,
                })
                .await;
        }
        Ok(())
    }

    /// Clear the peer selection and the thread bound to it.
    pub fn deselect_peer(&self) {
        if let Ok(mut guard) = self.state.lock() {
            guard.thread.deselect();
        }
    }

    /// Search the user directory by email fragment.
    pub async fn search_peers(&self, email: &str) -> Result<Vec<Identity>, ClientError> {
        Ok(self.api.search_users(email).await?)
    }

    /// Validate and transmit a message to the selected peer.
    ///
    /// There is no optimistic local append: the message joins the thread
    /// only when the server echoes it back over the push channel, so
    /// every visible message carries a server-assigned id and timestamp
    /// and double delivery collapses in the reconciler.
    pub async fn send_message(&self, text: &str) -> Result<(), ClientError> {
        let (from, to) = {
            let guard = self.state.lock().map_err(|_| ClientError::LockPoisoned)?;
            let from = guard
                .identity
                .as_ref()
                .map(|i| i.id.clone())
                .ok_or(ClientError::NotConnected)?;
            let to = guard
                .thread
                .selected_peer_id()
                .cloned()
                .ok_or(ClientError::InvalidInput("no peer selected"))?;
            (from, to)
        };

        let draft = compose::build_outbound(from, to, text)?;

        let binding = self.binding.as_ref().ok_or(ClientError::NotConnected)?;
        Ok(binding.handle.send(draft).await?)
    }

    /// Snapshot of the active thread's reconciled messages.
    pub fn messages(&self) -> Vec<Message> {
        self.state
            .lock()
            .map(|guard| guard.thread.messages().to_vec())
            .unwrap_or_default()
    }

    /// The resolved identity, if any.
    pub fn identity(&self) -> Option<Identity> {
        self.state.lock().ok().and_then(|guard| guard.identity.clone())
    }

    /// The currently selected peer, if any.
    pub fn selected_peer(&self) -> Option<Identity> {
        self.state
            .lock()
            .ok()
            .and_then(|guard| guard.thread.selected_peer().cloned())
    }

    /// Lifecycle state of the bound connection.
    pub fn connection_state(&self) -> ConnState {
        self.binding
            .as_ref()
            .map(|b| b.handle.state())
            .unwrap_or(ConnState::Disconnected)
    }
}
