//! In-process backend fixture: the HTTP endpoints and the WebSocket
//! push channel the client core talks to, with hooks for tests to seed
//! history, inject pushes, and observe registrations.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::ws::{Message as FixtureWsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{TimeZone, Utc};
use serde_json::json;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

use parley_shared::{
    ClientFrame, Identity, Message, MessageId, MessageKind, ServerFrame, ThreadKey, UserId,
};

/// The fixture's user directory.
const DIRECTORY: &[(&str, &str, &str)] = &[
    ("u1", "a@x.com", "alice"),
    ("u2", "b@x.com", "bob"),
    ("u3", "c@x.com", "carol"),
];

pub fn user(id: &str) -> Identity {
    let (_, email, username) = DIRECTORY
        .iter()
        .find(|(uid, _, _)| *uid == id)
        .expect("unknown fixture user");
    Identity {
        id: UserId::new(id),
        email: email.to_string(),
        username: username.to_string(),
        status: "online".to_string(),
    }
}

pub fn message(id: &str, from: &str, to: &str, text: &str, secs: i64) -> Message {
    Message {
        id: MessageId::new(id),
        from_user_id: UserId::new(from),
        to_user_id: UserId::new(to),
        content: Some(text.to_string()),
        kind: MessageKind::Text,
        created_at: Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap(),
    }
}

#[derive(Default)]
struct Inner {
    history: HashMap<ThreadKey, Vec<Message>>,
    connections: HashMap<UserId, UnboundedSender<String>>,
    registered_log: Vec<UserId>,
    live_connections: usize,
    next_message_id: u32,
}

#[derive(Clone, Default)]
pub struct ChatFixture {
    inner: Arc<Mutex<Inner>>,
}

impl ChatFixture {
    pub fn set_history(&self, a: &str, b: &str, messages: Vec<Message>) {
        let key = ThreadKey::new(UserId::new(a), UserId::new(b));
        self.inner.lock().unwrap().history.insert(key, messages);
    }

    /// Deliver a push to a registered connection, as the backend's
    /// fan-out would.
    pub fn push_to(&self, user_id: &str, message: Message) {
        let inner = self.inner.lock().unwrap();
        let conn = inner
            .connections
            .get(&UserId::new(user_id))
            .expect("push target is not registered");
        let json = ServerFrame::Dm(message).to_json().expect("encode push");
        conn.send(json).expect("push delivery");
    }

    pub fn live_connections(&self) -> usize {
        self.inner.lock().unwrap().live_connections
    }

    pub fn registered_log(&self) -> Vec<UserId> {
        self.inner.lock().unwrap().registered_log.clone()
    }

    pub fn is_registered(&self, user_id: &str) -> bool {
        self.inner
            .lock()
            .unwrap()
            .connections
            .contains_key(&UserId::new(user_id))
    }

    pub async fn wait_registered(&self, user_id: &str) {
        wait_until("fixture registration", || self.is_registered(user_id)).await;
    }
}

/// Poll a condition until it holds or a deadline passes.
pub async fn wait_until(what: &str, mut cond: impl FnMut() -> bool) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {what}");
}

async fn search_users(Query(params): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
    let email = params.get("email").cloned().unwrap_or_default();
    let matches: Vec<_> = DIRECTORY
        .iter()
        .filter(|(_, dir_email, _)| dir_email.contains(&email))
        .map(|(id, _, _)| serde_json::to_value(user(id)).unwrap())
        .collect();
    Json(json!({ "data": matches }))
}

async fn who_am_i(headers: HeaderMap) -> impl IntoResponse {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    // Valid tokens have the shape `tok-<user id>`
    let resolved = token
        .and_then(|t| t.strip_prefix("tok-"))
        .filter(|id| DIRECTORY.iter().any(|(uid, _, _)| uid == id));

    match resolved {
        Some(id) => Json(json!({ "data": user(id) })).into_response(),
        None => StatusCode::UNAUTHORIZED.into_response(),
    }
}

async fn chat_history(
    State(fixture): State<ChatFixture>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<serde_json::Value> {
    let user_id = params.get("userId").cloned().unwrap_or_default();
    let peer_id = params.get("peerId").cloned().unwrap_or_default();
    let key = ThreadKey::new(UserId::new(user_id), UserId::new(peer_id));

    let messages = fixture
        .inner
        .lock()
        .unwrap()
        .history
        .get(&key)
        .cloned()
        .unwrap_or_default();
    Json(json!({ "data": messages }))
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(fixture): State<ChatFixture>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| serve_socket(socket, fixture))
}

async fn serve_socket(mut socket: WebSocket, fixture: ChatFixture) {
    let (tx, mut rx) = unbounded_channel::<String>();
    fixture.inner.lock().unwrap().live_connections += 1;
    let mut registered_as: Option<UserId> = None;

    loop {
        tokio::select! {
            outbound = rx.recv() => {
                let Some(text) = outbound else { break };
                if socket.send(FixtureWsMessage::Text(text)).await.is_err() {
                    break;
                }
            }
            inbound = socket.recv() => {
                let Some(Ok(ws_msg)) = inbound else { break };
                let FixtureWsMessage::Text(text) = ws_msg else { continue };
                let Ok(frame) = ClientFrame::from_json(&text) else { continue };

                match frame {
                    ClientFrame::Register { user_id } => {
                        let mut inner = fixture.inner.lock().unwrap();
                        inner.connections.insert(user_id.clone(), tx.clone());
                        inner.registered_log.push(user_id.clone());
                        registered_as = Some(user_id);
                    }
                    ClientFrame::Dm(outbound) => {
                        let mut inner = fixture.inner.lock().unwrap();
                        inner.next_message_id += 1;
                        let stored = Message {
                            id: MessageId::new(format!("srv-{}", inner.next_message_id)),
                            from_user_id: outbound.from_user_id.clone(),
                            to_user_id: outbound.to_user_id.clone(),
                            content: Some(outbound.text),
                            kind: MessageKind::Text,
                            created_at: Utc::now(),
                        };
                        let json = ServerFrame::Dm(stored).to_json().expect("encode dm");

                        // Fan out to both participants; the sender's copy
                        // is the delivery echo.
                        let mut targets = vec![outbound.from_user_id];
                        if outbound.to_user_id != targets[0] {
                            targets.push(outbound.to_user_id);
                        }
                        for target in targets {
                            if let Some(conn) = inner.connections.get(&target) {
                                let _ = conn.send(json.clone());
                            }
                        }
                    }
                }
            }
        }
    }

    let mut inner = fixture.inner.lock().unwrap();
    inner.live_connections -= 1;
    if let Some(user_id) = registered_as {
        let owned_by_this_socket = inner
            .connections
            .get(&user_id)
            .map(|conn| conn.same_channel(&tx))
            .unwrap_or(false);
        if owned_by_this_socket {
            inner.connections.remove(&user_id);
        }
    }
}

pub async fn spawn_chat_fixture() -> (SocketAddr, ChatFixture) {
    let fixture = ChatFixture::default();
    let router = Router::new()
        .route("/users/search", get(search_users))
        .route("/auth/me", get(who_am_i))
        .route("/chat/history", get(chat_history))
        .route("/ws", get(ws_handler))
        .with_state(fixture.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fixture listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve fixture");
    });
    (addr, fixture)
}
