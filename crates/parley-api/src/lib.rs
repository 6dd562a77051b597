//! # parley-api
//!
//! HTTP request/response collaborators consumed by the session core:
//! user-directory search, `who-am-I` identity lookup against a bearer
//! credential, point-in-time conversation history snapshots, and the
//! external identity provider hand-off URL.

pub mod client;

mod error;

pub use client::{ApiClient, ExternalProvider};
pub use error::ApiError;
