//! In-memory stores for tests and single-node development.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::RwLock;

use quill_core::UserId;
use quill_core::error::AppError;
use quill_core::result::AppResult;
use quill_entity::token::RefreshTokenRecord;
use quill_entity::user::{CreateUser, User};

use super::{RefreshTokenStore, UserStore, hash_token};

/// Refresh token records keyed by user.
///
/// The map key plays the role of the primary key: each `put` replaces the
/// entry for its user under the shard lock.
#[derive(Debug, Clone, Default)]
pub struct MemoryRefreshTokenStore {
    records: Arc<DashMap<UserId, RefreshTokenRecord>>,
}

impl MemoryRefreshTokenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record currently held for `user_id`, whatever its token.
    pub fn get(&self, user_id: UserId) -> Option<RefreshTokenRecord> {
        self.records.get(&user_id).map(|r| r.value().clone())
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn put(
        &self,
        user_id: UserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let token_hash = hash_token(token);
        let now = Utc::now();

        self.records
            .entry(user_id)
            .and_modify(|record| {
                record.token_hash = token_hash.clone();
                record.expires_at = expires_at;
                record.updated_at = now;
            })
            .or_insert_with(|| RefreshTokenRecord {
                user_id,
                token_hash: token_hash.clone(),
                expires_at,
                created_at: now,
                updated_at: now,
            });

        Ok(())
    }

    async fn find_current(
        &self,
        user_id: UserId,
        token: &str,
    ) -> AppResult<Option<RefreshTokenRecord>> {
        let token_hash = hash_token(token);
        Ok(self
            .records
            .get(&user_id)
            .filter(|record| record.token_hash == token_hash)
            .map(|record| record.value().clone()))
    }

    async fn rotate(
        &self,
        user_id: UserId,
        current: &str,
        next: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let current_hash = hash_token(current);

        // The entry guard holds the shard lock across compare and write.
        match self.records.get_mut(&user_id) {
            Some(mut record) if record.token_hash == current_hash => {
                record.token_hash = hash_token(next);
                record.expires_at = expires_at;
                record.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_by_token(&self, token: &str) -> AppResult<()> {
        let token_hash = hash_token(token);
        self.records
            .retain(|_, record| record.token_hash != token_hash);
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut removed = 0u64;
        self.records.retain(|_, record| {
            let expired = record.is_expired_at(now);
            if expired {
                removed += 1;
            }
            !expired
        });
        Ok(removed)
    }
}

/// Users held in a single map behind a Tokio lock.
///
/// `create` checks uniqueness and inserts under one write guard.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl MemoryUserStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn username_taken(&self, username: &str) -> AppResult<bool> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .any(|u| u.username.eq_ignore_ascii_case(username)))
    }

    async fn email_taken(&self, email: &str) -> AppResult<bool> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(email)))
    }

    async fn create(&self, data: CreateUser) -> AppResult<User> {
        let mut users = self.users.write().await;

        let duplicate = users.values().any(|u| {
            u.username.eq_ignore_ascii_case(&data.username)
                || u.email.eq_ignore_ascii_case(&data.email)
        });
        if duplicate {
            return Err(AppError::conflict("User already registered"));
        }

        let user = User::from_create(data, Utc::now());
        users.insert(user.id, user.clone());
        Ok(user)
    }
}
