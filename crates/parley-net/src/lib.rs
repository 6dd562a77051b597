//! Realtime connection layer.
//!
//! One persistent WebSocket connection per bound identity, driven by a
//! dedicated tokio task and controlled through typed command and
//! notification channels. Registration (announcing the local user id)
//! happens as part of connection establishment; pushes are only
//! guaranteed to be delivered after it.

pub mod connection;

mod error;

pub use connection::{
    spawn_connection, ConnState, ConnectionCommand, ConnectionConfig, ConnectionHandle,
    ConnectionNotification,
};
pub use error::NetError;
