use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{MessageId, MessageKind, ThreadKey, UserId};

/// A delivered chat message. Immutable once created; the server assigns
/// `id` and `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    /// Text body. Absent for media messages whose payload lives elsewhere.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// The conversation this message belongs to.
    pub fn thread_key(&self) -> ThreadKey {
        ThreadKey::new(self.from_user_id.clone(), self.to_user_id.clone())
    }
}

/// An outbound message draft as transmitted to the server. The server
/// echoes the stored record back over the push channel; there is no
/// synchronous acknowledgment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    pub text: String,
}

/// Frames sent from the client to the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ClientFrame {
    /// Announce the local identity so pushes addressed to it are
    /// delivered on this connection.
    #[serde(rename_all = "camelCase")]
    Register { user_id: UserId },

    /// Send a direct message.
    Dm(OutboundMessage),
}

/// Frames pushed from the server to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ServerFrame {
    /// A direct message addressed to a registered participant. The
    /// sender's own messages come back through here as well.
    Dm(Message),
}

impl ClientFrame {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }
}

impl ServerFrame {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_message() -> Message {
        Message {
            id: MessageId::new("m1"),
            from_user_id: UserId::new("u2"),
            to_user_id: UserId::new("u1"),
            content: Some("hello".to_string()),
            kind: MessageKind::Text,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_register_frame_wire_shape() {
        let frame = ClientFrame::Register {
            user_id: UserId::new("u1"),
        };
        let json = frame.to_json().unwrap();
        assert_eq!(json, r#"{"type":"register","data":{"userId":"u1"}}"#);
        assert_eq!(ClientFrame::from_json(&json).unwrap(), frame);
    }

    #[test]
    fn test_dm_frame_round_trip() {
        let frame = ClientFrame::Dm(OutboundMessage {
            from_user_id: UserId::new("u1"),
            to_user_id: UserId::new("u2"),
            text: "hi".to_string(),
        });
        let json = frame.to_json().unwrap();
        assert!(json.contains(r#""type":"dm""#));
        assert!(json.contains(r#""fromUserId":"u1""#));
        assert_eq!(ClientFrame::from_json(&json).unwrap(), frame);
    }

    #[test]
    fn test_server_dm_parses_backend_json() {
        let json = r#"{
            "type": "dm",
            "data": {
                "id": "m1",
                "fromUserId": "u2",
                "toUserId": "u1",
                "content": "hello",
                "type": "text",
                "createdAt": "2024-05-01T12:00:00Z"
            }
        }"#;
        let ServerFrame::Dm(msg) = ServerFrame::from_json(json).unwrap();
        assert_eq!(msg, sample_message());
    }

    #[test]
    fn test_media_message_null_content() {
        let json = r#"{
            "id": "m9",
            "fromUserId": "u1",
            "toUserId": "u2",
            "content": null,
            "type": "media",
            "createdAt": "2024-05-01T12:00:00Z"
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.kind, MessageKind::Media);
        assert!(msg.content.is_none());
    }

    #[test]
    fn test_message_thread_key_is_unordered() {
        let msg = sample_message();
        assert_eq!(
            msg.thread_key(),
            ThreadKey::new(UserId::new("u1"), UserId::new("u2"))
        );
    }
}
