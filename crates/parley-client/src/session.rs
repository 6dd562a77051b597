//! Session bootstrap: resolving the local identity.
//!
//! Three paths lead to a resolved [`Identity`]: a one-time token in the
//! navigation URL (the tail end of an external provider hand-off), a
//! credential persisted from an earlier run, and direct email lookup.
//! Whichever succeeds, the identity is immutable until logout replaces
//! the whole session.

use std::sync::Arc;

use tracing::{debug, info, warn};
use url::Url;

use parley_api::{ApiClient, ApiError, ExternalProvider};
use parley_shared::constants::TOKEN_QUERY_PARAM;
use parley_shared::Identity;
use parley_store::Database;

use crate::error::ClientError;

/// Result of scanning a navigation URL for a one-time credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlBootstrap {
    /// Whether a token was found and persisted.
    pub token_found: bool,
    /// The URL with the token parameter removed, for the surface to put
    /// in place of the original.
    pub sanitized_url: String,
}

/// Identity resolution and credential custody.
///
/// The persisted credential is write-owned here: saved when a URL token
/// arrives, discarded on rejection or logout, read once at startup.
pub struct Session {
    api: Arc<ApiClient>,
    store: Database,
}

impl Session {
    pub fn new(api: Arc<ApiClient>, store: Database) -> Self {
        Self { api, store }
    }

    /// Inspect a navigation URL for a one-time token parameter.
    ///
    /// When present the token is persisted as the session credential and
    /// stripped from the returned URL: it must not remain discoverable
    /// through that channel after first use. When absent, nothing is
    /// persisted and the URL comes back unchanged.
    pub fn bootstrap_from_url(&self, current_url: &str) -> Result<UrlBootstrap, ClientError> {
        let mut url = Url::parse(current_url)?;

        let token = url
            .query_pairs()
            .find(|(key, _)| key == TOKEN_QUERY_PARAM)
            .map(|(_, value)| value.into_owned());

        let Some(token) = token else {
            return Ok(UrlBootstrap {
                token_found: false,
                sanitized_url: url.into(),
            });
        };

        self.store.save_credential(&token)?;
        info!("one-time token consumed from navigation URL");

        let remaining: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != TOKEN_QUERY_PARAM)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        url.set_query(None);
        if !remaining.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &remaining {
                pairs.append_pair(key, value);
            }
        }

        Ok(UrlBootstrap {
            token_found: true,
            sanitized_url: url.into(),
        })
    }

    /// Resolve the identity from the persisted credential, if any.
    ///
    /// A rejected credential is discarded on the spot and the session
    /// stays unresolved; there is no retry.
    pub async fn bootstrap_from_stored_credential(&self) -> Result<Option<Identity>, ClientError> {
        let Some(token) = self.store.load_credential()? else {
            debug!("no stored credential");
            return Ok(None);
        };

        match self.api.who_am_i(&token).await {
            Ok(identity) => {
                info!(user = %identity.id, "session resolved from stored credential");
                Ok(Some(identity))
            }
            Err(ApiError::AuthRejected) => {
                warn!("stored credential rejected, discarding");
                self.store.clear_credential()?;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The startup protocol: consume a URL token first, then fall back
    /// to whatever credential is stored.
    ///
    /// A freshly consumed token is persisted before the stored-credential
    /// path runs, so both cases resolve through the same `who-am-I`
    /// exchange. Returns the resolved identity (if any) and the
    /// sanitized URL (if one was given).
    pub async fn bootstrap(
        &self,
        current_url: Option<&str>,
    ) -> Result<(Option<Identity>, Option<String>), ClientError> {
        let sanitized = match current_url {
            Some(url) => Some(self.bootstrap_from_url(url)?.sanitized_url),
            None => None,
        };
        let identity = self.bootstrap_from_stored_credential().await?;
        Ok((identity, sanitized))
    }

    /// Resolve an identity by exact email lookup.
    ///
    /// The first directory match wins; an empty result is `NotFound`.
    /// No secret is verified on this path (the core takes no password),
    /// so the directory is the trust boundary here.
    pub async fn login_by_email(&self, email: &str) -> Result<Identity, ClientError> {
        let results = self.api.search_users(email).await?;

        let Some(identity) = results.into_iter().next() else {
            debug!(email = %email, "no user matched login email");
            return Err(ClientError::NotFound);
        };

        info!(user = %identity.id, "logged in by email lookup");
        Ok(identity)
    }

    /// The redirect URL handing control to an external identity
    /// provider. Never resolves an identity synchronously: the provider
    /// returns control through the URL-token path.
    pub fn external_login_url(&self, provider: ExternalProvider) -> Result<Url, ClientError> {
        Ok(self.api.external_login_url(provider)?)
    }

    /// Discard the persisted credential. The caller clears the identity
    /// and tears down the connection.
    pub fn logout(&self) -> Result<(), ClientError> {
        self.store.clear_credential()?;
        info!("session credential cleared");
        Ok(())
    }
}
