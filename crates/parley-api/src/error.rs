use thiserror::Error;

/// Errors produced by the HTTP API layer.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The server rejected the presented credential.
    #[error("Credential rejected by the server")]
    AuthRejected,

    /// The request did not complete within the client timeout.
    #[error("Request timed out")]
    Timeout,

    /// Transport or protocol-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// The response did not have the expected envelope shape.
    #[error("Unexpected response shape: {0}")]
    UnexpectedResponse(String),

    /// The configured base URL could not be parsed or joined.
    #[error("Invalid API URL: {0}")]
    Url(#[from] url::ParseError),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Http(e)
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ApiError>;
