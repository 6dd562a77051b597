use thiserror::Error;

use parley_api::ApiError;
use parley_net::NetError;
use parley_store::StoreError;

/// Errors surfaced to callers of the client core.
#[derive(Error, Debug)]
pub enum ClientError {
    /// A draft or selection precondition failed (empty message text, no
    /// peer selected).
    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),

    /// The directory lookup matched no user.
    #[error("No user matches that email")]
    NotFound,

    /// The presented or stored credential was rejected by the server.
    #[error("Credential rejected by the server")]
    AuthRejected,

    /// An operation required a registered connection and none exists.
    #[error("Not connected: no registered connection")]
    NotConnected,

    /// A navigation URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Api(ApiError),

    #[error(transparent)]
    Net(NetError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The shared state mutex was poisoned by a panicking task.
    #[error("Client state lock poisoned")]
    LockPoisoned,
}

impl From<ApiError> for ClientError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::AuthRejected => ClientError::AuthRejected,
            other => ClientError::Api(other),
        }
    }
}

impl From<NetError> for ClientError {
    fn from(e: NetError) -> Self {
        match e {
            NetError::NotConnected => ClientError::NotConnected,
            other => ClientError::Net(other),
        }
    }
}
