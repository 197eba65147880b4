//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use quill_core::UserId;

/// A registered blog author.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier; the identity claim carried in tokens.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Human-readable name.
    pub name: String,
    /// Unique email address.
    pub email: String,
    /// Argon2 password hash in PHC string format.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Desired username.
    pub username: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
}

impl User {
    /// Builds a fresh user row from creation data, stamped with `now`.
    pub fn from_create(data: CreateUser, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            username: data.username,
            name: data.name,
            email: data.email,
            password_hash: data.password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}
