//! # parley-client
//!
//! The session core of the Parley messaging client: identity bootstrap
//! ([`session`]), the realtime connection binding with its inbound
//! bridge ([`client`]), thread reconciliation for the selected peer
//! ([`thread`]), and outbound message drafting ([`compose`]).
//!
//! Rendering is out of scope: the presentation layer drives
//! [`ChatClient`] and consumes [`ClientEvent`]s from the channel handed
//! out at construction time.

pub mod client;
pub mod compose;
pub mod config;
pub mod events;
pub mod session;
pub mod thread;

mod bridge;
mod error;
mod state;

pub use client::ChatClient;
pub use config::ClientConfig;
pub use error::ClientError;
pub use events::ClientEvent;
pub use parley_api::ExternalProvider;

use tracing_subscriber::{fmt, EnvFilter};

/// Initialise tracing for shells embedding the client.
///
/// Honors `RUST_LOG`; defaults to debug for the core crates and warn for
/// everything else.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("parley_client=debug,parley_net=debug,parley_api=info,parley_store=info,warn")
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
