//! Outbound message drafting.

use parley_shared::{OutboundMessage, UserId};

use crate::error::ClientError;

/// Validate and shape a draft for transmission.
///
/// The draft carries no id and no timestamp: the server assigns both,
/// and the stored record becomes visible only through the push channel.
pub fn build_outbound(from: UserId, to: UserId, text: &str) -> Result<OutboundMessage, ClientError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ClientError::InvalidInput("message text is empty"));
    }

    Ok(OutboundMessage {
        from_user_id: from,
        to_user_id: to,
        text: text.to_string(),
    })
}
