//! # parley-store
//!
//! Local persistence for the Parley client.
//!
//! The only durable state the client keeps across restarts is the
//! session credential (an opaque bearer token). It lives in a small
//! SQLite database in the platform data directory, behind a synchronous
//! [`Database`] handle that runs migrations before any other operation.

pub mod credential;
pub mod database;
pub mod migrations;

mod error;

pub use database::Database;
pub use error::StoreError;
