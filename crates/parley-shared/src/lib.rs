//! # parley-shared
//!
//! Domain types and the wire protocol shared by every Parley crate:
//! user and message identifiers, the resolved [`identity::Identity`]
//! record, the [`protocol::Message`] shape, and the JSON frames
//! exchanged over the realtime connection.

pub mod constants;
pub mod identity;
pub mod protocol;
pub mod types;

pub use identity::Identity;
pub use protocol::{ClientFrame, Message, OutboundMessage, ServerFrame};
pub use types::{MessageId, MessageKind, ThreadKey, UserId};
