//! PostgreSQL-backed stores wrapping the database repositories.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use quill_core::UserId;
use quill_core::result::AppResult;
use quill_database::repositories::{RefreshTokenRepository, UserRepository};
use quill_entity::token::RefreshTokenRecord;
use quill_entity::user::{CreateUser, User};

use super::{RefreshTokenStore, UserStore, hash_token};

/// Refresh token store over the `refresh_tokens` table.
#[derive(Debug, Clone)]
pub struct PgRefreshTokenStore {
    repo: Arc<RefreshTokenRepository>,
}

impl PgRefreshTokenStore {
    /// Creates a store over the given repository.
    pub fn new(repo: Arc<RefreshTokenRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl RefreshTokenStore for PgRefreshTokenStore {
    async fn put(
        &self,
        user_id: UserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.repo
            .upsert(user_id, &hash_token(token), expires_at)
            .await
    }

    async fn find_current(
        &self,
        user_id: UserId,
        token: &str,
    ) -> AppResult<Option<RefreshTokenRecord>> {
        self.repo
            .find_by_user_and_hash(user_id, &hash_token(token))
            .await
    }

    async fn rotate(
        &self,
        user_id: UserId,
        current: &str,
        next: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        self.repo
            .replace_if_current(user_id, &hash_token(current), &hash_token(next), expires_at)
            .await
    }

    async fn delete_by_token(&self, token: &str) -> AppResult<()> {
        self.repo.delete_by_hash(&hash_token(token)).await?;
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        self.repo.delete_expired(now).await
    }
}

/// User store over the `users` table.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    repo: Arc<UserRepository>,
}

impl PgUserStore {
    /// Creates a store over the given repository.
    pub fn new(repo: Arc<UserRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        self.repo.find_by_id(id).await
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.repo.find_by_username(username).await
    }

    async fn username_taken(&self, username: &str) -> AppResult<bool> {
        self.repo.exists_by_username(username).await
    }

    async fn email_taken(&self, email: &str) -> AppResult<bool> {
        self.repo.exists_by_email(email).await
    }

    async fn create(&self, data: CreateUser) -> AppResult<User> {
        let user = User::from_create(data, Utc::now());
        self.repo.create(&user).await
    }
}
