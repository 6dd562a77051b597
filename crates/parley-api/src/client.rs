//! The HTTP API client.
//!
//! Every endpoint is plain request/response JSON wrapped in the server's
//! `{"data": ...}` envelope. Identity resolution and history snapshots
//! are point-in-time reads; nothing here is long-lived.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;
use url::Url;

use parley_shared::{Identity, Message, UserId};

use crate::error::{ApiError, Result};

/// Default per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// External identity providers the login surface can hand off to.
///
/// The hand-off is an opaque redirect; the provider returns control by
/// delivering a one-time token as a URL query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalProvider {
    Google,
    Facebook,
    LinkedIn,
    GitHub,
}

impl ExternalProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExternalProvider::Google => "google",
            ExternalProvider::Facebook => "facebook",
            ExternalProvider::LinkedIn => "linkedin",
            ExternalProvider::GitHub => "github",
        }
    }
}

/// Server response envelope. Endpoints that find nothing return a null
/// or missing `data` field rather than an error status.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

/// Client for the HTTP side of the backend: directory search, identity
/// lookup, and history snapshots.
pub struct ApiClient {
    base: Url,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a client against the given base URL (scheme + host + port).
    pub fn new(base: &str) -> Result<Self> {
        let base = Url::parse(base)?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { base, http })
    }

    /// Search the user directory by email fragment.
    ///
    /// Returns an empty list when nothing matches; used both for
    /// login-by-email (exact address) and for peer search (fragment).
    pub async fn search_users(&self, email: &str) -> Result<Vec<Identity>> {
        let url = self.base.join("users/search")?;
        debug!(email = %email, "searching user directory");

        let resp = self
            .http
            .get(url)
            .query(&[("email", email)])
            .send()
            .await?
            .error_for_status()?;

        let envelope: Envelope<Vec<Identity>> = resp.json().await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// Resolve the identity bound to a bearer credential.
    ///
    /// Any non-success status means the credential is invalid or expired;
    /// the caller is expected to discard it.
    pub async fn who_am_i(&self, token: &str) -> Result<Identity> {
        let url = self.base.join("auth/me")?;

        let resp = self.http.get(url).bearer_auth(token).send().await?;

        if !resp.status().is_success() {
            debug!(status = %resp.status(), "credential rejected");
            return Err(ApiError::AuthRejected);
        }

        let envelope: Envelope<Identity> = resp.json().await?;
        envelope
            .data
            .ok_or_else(|| ApiError::UnexpectedResponse("who-am-I returned no identity".into()))
    }

    /// Fetch the message history snapshot for a conversation, as of the
    /// time the server handles the request.
    pub async fn fetch_history(&self, user_id: &UserId, peer_id: &UserId) -> Result<Vec<Message>> {
        let url = self.base.join("chat/history")?;
        debug!(user = %user_id, peer = %peer_id, "fetching history snapshot");

        let resp = self
            .http
            .get(url)
            .query(&[("userId", user_id.as_str()), ("peerId", peer_id.as_str())])
            .send()
            .await?
            .error_for_status()?;

        let envelope: Envelope<Vec<Message>> = resp.json().await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// The redirect entry point for an external identity provider.
    ///
    /// Navigation itself is the surface's job; the provider eventually
    /// returns control by loading the application with a one-time token
    /// in the URL.
    pub fn external_login_url(&self, provider: ExternalProvider) -> Result<Url> {
        Ok(self.base.join(&format!("auth/{}", provider.as_str()))?)
    }
}
