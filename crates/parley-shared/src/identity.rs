use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// The resolved local user record bound to a session.
///
/// Immutable once resolved: logout/re-login replaces the whole value,
/// fields are never mutated individually.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub status: String,
}
