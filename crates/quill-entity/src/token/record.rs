//! Refresh token record: the single live refresh token for a user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use quill_core::UserId;

/// Relates a user to the one refresh token currently valid for them.
///
/// `user_id` is the primary key, so at most one record per user can exist.
/// Only the SHA-256 digest of the token is kept.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshTokenRecord {
    /// Owning user.
    pub user_id: UserId,
    /// Lowercase hex SHA-256 of the raw refresh token.
    #[serde(skip_serializing)]
    pub token_hash: String,
    /// Cryptographic expiry of the stored token.
    pub expires_at: DateTime<Utc>,
    /// When the first token for this user was stored.
    pub created_at: DateTime<Utc>,
    /// When the record was last rotated.
    pub updated_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// Checks whether the stored token has expired as of `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
