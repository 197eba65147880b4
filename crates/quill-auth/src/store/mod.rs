//! Persistence seams for the session subsystem.
//!
//! Two traits are defined here and implemented twice:
//! - PostgreSQL ([`postgres`]), wrapping the `quill-database` repositories
//! - In-memory ([`memory`]), for tests and single-node development

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use quill_core::UserId;
use quill_core::result::AppResult;
use quill_entity::token::RefreshTokenRecord;
use quill_entity::user::{CreateUser, User};

pub use memory::{MemoryRefreshTokenStore, MemoryUserStore};
pub use postgres::{PgRefreshTokenStore, PgUserStore};

/// Holds at most one live refresh token per user.
///
/// Implementations must make `put` a single atomic upsert keyed by user so
/// concurrent logins and refreshes for the same user serialize at the store.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync + 'static {
    /// Insert or replace the record for `user_id`. Any earlier token for that
    /// user stops matching [`RefreshTokenStore::find_current`].
    async fn put(&self, user_id: UserId, token: &str, expires_at: DateTime<Utc>)
    -> AppResult<()>;

    /// Returns the record only if it exists for `user_id` and holds exactly `token`.
    async fn find_current(
        &self,
        user_id: UserId,
        token: &str,
    ) -> AppResult<Option<RefreshTokenRecord>>;

    /// Replaces `current` with `next` only if the record for `user_id` still
    /// holds `current`. Returns `false` when it does not, so of two concurrent
    /// rotations of the same token at most one succeeds.
    async fn rotate(
        &self,
        user_id: UserId,
        current: &str,
        next: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Removes the record holding `token`. Absence is not an error.
    async fn delete_by_token(&self, token: &str) -> AppResult<()>;

    /// Removes every record that expired at or before `now`. Returns the count.
    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// The user lookups and creation the session flows depend on.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Find a user by ID.
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// Find a user by username (case-insensitive).
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Whether the username is already registered.
    async fn username_taken(&self, username: &str) -> AppResult<bool>;

    /// Whether the email is already registered.
    async fn email_taken(&self, email: &str) -> AppResult<bool>;

    /// Persist a new user. Fails with a conflict on a duplicate username or email.
    async fn create(&self, data: CreateUser) -> AppResult<User>;
}

/// Digest under which a refresh token is stored and looked up.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
