//! Session flows: register, login, logout, refresh, and the gate check.
//!
//! Every flow that hands out tokens persists the refresh token before
//! returning. If that write fails the whole flow fails and no tokens leave
//! this module.

use std::sync::Arc;

use tracing::{info, warn};

use quill_core::error::AppError;
use quill_entity::user::{CreateUser, User, UserView};

use crate::UNAUTHORIZED;
use crate::jwt::{TokenPair, TokenSigner};
use crate::password::PasswordHasher;
use crate::store::{RefreshTokenStore, UserStore};

/// Message returned for any login failure, whichever half was wrong.
const INVALID_LOGIN: &str = "Invalid username or password";

/// Registration input, already validated by the HTTP layer.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Desired username.
    pub username: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// A successful register, login, or refresh: who, plus the new pair.
#[derive(Debug, Clone)]
pub struct SessionGrant {
    /// The authenticated user.
    pub user: UserView,
    /// Tokens to hand to the client.
    pub tokens: TokenPair,
}

/// Orchestrates the signer, the stores, and the password hasher.
#[derive(Clone)]
pub struct SessionProtocol {
    signer: Arc<TokenSigner>,
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn RefreshTokenStore>,
    hasher: Arc<PasswordHasher>,
}

impl std::fmt::Debug for SessionProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionProtocol")
            .field("signer", &self.signer)
            .finish()
    }
}

impl SessionProtocol {
    /// Creates the protocol from its collaborators.
    pub fn new(
        signer: Arc<TokenSigner>,
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn RefreshTokenStore>,
        hasher: Arc<PasswordHasher>,
    ) -> Self {
        Self {
            signer,
            users,
            tokens,
            hasher,
        }
    }

    /// Registers a new account and opens its first session.
    ///
    /// 1. Reject a taken email, then a taken username
    /// 2. Hash the password
    /// 3. Persist the user
    /// 4. Mint a pair and store the refresh token
    pub async fn register(&self, account: NewAccount) -> Result<SessionGrant, AppError> {
        if self.users.email_taken(&account.email).await? {
            return Err(AppError::conflict(
                "User already registered, use another email",
            ));
        }
        if self.users.username_taken(&account.username).await? {
            return Err(AppError::conflict(
                "Username is unavailable, choose another username",
            ));
        }

        let password_hash = self.hash_password(account.password).await?;

        let user = self
            .users
            .create(CreateUser {
                username: account.username,
                name: account.name,
                email: account.email,
                password_hash,
            })
            .await?;

        let grant = self.open_session(&user).await?;
        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(grant)
    }

    /// Authenticates by username and password and rotates the user's refresh
    /// token, invalidating any earlier one.
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionGrant, AppError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::invalid_credentials(INVALID_LOGIN))?;

        let matches = self
            .verify_password(password.to_string(), user.password_hash.clone())
            .await?;
        if !matches {
            warn!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AppError::invalid_credentials(INVALID_LOGIN));
        }

        let grant = self.open_session(&user).await?;
        info!(user_id = %user.id, "Login successful");
        Ok(grant)
    }

    /// Forgets the refresh token presented with the logout request.
    ///
    /// A missing cookie or an unknown token is a successful logout.
    pub async fn logout(&self, refresh_token: Option<&str>) -> Result<(), AppError> {
        if let Some(token) = refresh_token {
            self.tokens.delete_by_token(token).await?;
        }
        info!("Logout completed");
        Ok(())
    }

    /// Exchanges a current refresh token for a new pair.
    ///
    /// 1. Verify signature and expiry
    /// 2. Require the token to be the one on file for its user
    /// 3. Resolve the user
    /// 4. Mint a new pair and swap it in only if the presented token is
    ///    still the one on file
    ///
    /// The presented token is dead once this returns `Ok`. Two concurrent
    /// refreshes with the same token cannot both succeed: the loser's swap
    /// finds the winner's token on file and fails.
    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<SessionGrant, AppError> {
        let token = refresh_token.ok_or_else(|| AppError::unauthorized(UNAUTHORIZED))?;
        let user_id = self.signer.verify_refresh(token)?;

        if self.tokens.find_current(user_id, token).await?.is_none() {
            warn!(user_id = %user_id, "Refresh rejected: token superseded or revoked");
            return Err(AppError::unauthorized(UNAUTHORIZED));
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized(UNAUTHORIZED))?;

        let tokens = self.signer.issue_pair(user.id)?;
        let rotated = self
            .tokens
            .rotate(
                user.id,
                token,
                &tokens.refresh.token,
                tokens.refresh.expires_at,
            )
            .await?;
        if !rotated {
            warn!(user_id = %user.id, "Refresh rejected: token replaced concurrently");
            return Err(AppError::unauthorized(UNAUTHORIZED));
        }

        info!(user_id = %user.id, "Token refreshed");
        Ok(SessionGrant {
            user: UserView::from(&user),
            tokens,
        })
    }

    /// The request gate: both cookies present, access token valid, user exists.
    ///
    /// Only the access token is verified. An expired access token is not
    /// renewed here; the client calls refresh.
    pub async fn authenticate(
        &self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> Result<UserView, AppError> {
        let (Some(access_token), Some(_)) = (access_token, refresh_token) else {
            return Err(AppError::unauthorized(UNAUTHORIZED));
        };

        let user_id = self.signer.verify_access(access_token)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized(UNAUTHORIZED))?;

        Ok(UserView::from(user))
    }

    async fn open_session(&self, user: &User) -> Result<SessionGrant, AppError> {
        let tokens = self.signer.issue_pair(user.id)?;

        self.tokens
            .put(user.id, &tokens.refresh.token, tokens.refresh.expires_at)
            .await?;

        Ok(SessionGrant {
            user: UserView::from(user),
            tokens,
        })
    }

    async fn hash_password(&self, password: String) -> Result<String, AppError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, AppError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.verify_password(&password, &hash))
            .await
            .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?
    }
}
