//! JWT claims embedded in access and refresh tokens.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quill_core::UserId;

/// Claims payload shared by both token kinds.
///
/// The user identity is the only meaningful payload. `jti` is a random
/// nonce so that two tokens minted in the same second never collide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user ID.
    pub sub: UserId,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Token nonce.
    pub jti: Uuid,
}

/// Which secret and lifetime a token is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Short-lived token checked on every protected request.
    Access,
    /// Longer-lived token exchanged for a new pair.
    Refresh,
}

impl TokenKind {
    /// Lowercase name used in log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}
