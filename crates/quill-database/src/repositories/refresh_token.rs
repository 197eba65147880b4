//! Refresh token repository implementation.
//!
//! The table is keyed by `user_id`, so every write is an upsert that
//! replaces the previous token for that user in a single statement.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use quill_core::UserId;
use quill_core::error::{AppError, ErrorKind};
use quill_core::result::AppResult;
use quill_entity::token::RefreshTokenRecord;

/// Repository for the one-per-user refresh token records.
#[derive(Debug, Clone)]
pub struct RefreshTokenRepository {
    pool: PgPool,
}

impl RefreshTokenRepository {
    /// Create a new refresh token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or replace the record for `user_id`.
    pub async fn upsert(
        &self,
        user_id: UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO refresh_tokens (user_id, token_hash, expires_at, created_at, updated_at) \
             VALUES ($1, $2, $3, NOW(), NOW()) \
             ON CONFLICT (user_id) DO UPDATE \
             SET token_hash = EXCLUDED.token_hash, \
                 expires_at = EXCLUDED.expires_at, \
                 updated_at = NOW()",
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to store refresh token", e)
        })?;
        Ok(())
    }

    /// Swap `current_hash` for `next_hash` in a single conditional update.
    ///
    /// Returns `false` when the row for `user_id` no longer holds
    /// `current_hash`, i.e. another writer rotated or revoked it first.
    pub async fn replace_if_current(
        &self,
        user_id: UserId,
        current_hash: &str,
        next_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE refresh_tokens \
             SET token_hash = $3, expires_at = $4, updated_at = NOW() \
             WHERE user_id = $1 AND token_hash = $2",
        )
        .bind(user_id)
        .bind(current_hash)
        .bind(next_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to rotate refresh token", e)
        })?;
        Ok(result.rows_affected() == 1)
    }

    /// Find the record for `user_id` only if it still holds `token_hash`.
    pub async fn find_by_user_and_hash(
        &self,
        user_id: UserId,
        token_hash: &str,
    ) -> AppResult<Option<RefreshTokenRecord>> {
        sqlx::query_as::<_, RefreshTokenRecord>(
            "SELECT * FROM refresh_tokens WHERE user_id = $1 AND token_hash = $2",
        )
        .bind(user_id)
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find refresh token", e)
        })
    }

    /// Delete the record holding `token_hash`. Returns the number of rows removed.
    pub async fn delete_by_hash(&self, token_hash: &str) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete refresh token", e)
            })?;
        Ok(result.rows_affected())
    }

    /// Delete every record whose token expired at or before `now`.
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    "Failed to purge expired refresh tokens",
                    e,
                )
            })?;
        Ok(result.rows_affected())
    }
}
