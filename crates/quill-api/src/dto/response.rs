//! Response DTOs.

use serde::{Deserialize, Serialize};

use quill_entity::user::UserView;

/// Body returned by every session endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    /// The signed-in user, or `null` after logout.
    pub user: Option<UserView>,
    /// Whether the client now holds a session.
    pub auth: bool,
}

impl SessionResponse {
    /// A live session for `user`.
    pub fn authenticated(user: UserView) -> Self {
        Self {
            user: Some(user),
            auth: true,
        }
    }

    /// No session.
    pub fn signed_out() -> Self {
        Self {
            user: None,
            auth: false,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the process can answer.
    pub status: String,
    /// Crate version.
    pub version: String,
}
