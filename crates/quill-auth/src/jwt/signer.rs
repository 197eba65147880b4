//! Access and refresh token signing and verification.
//!
//! Each token kind has its own HMAC secret and lifetime, so a refresh token
//! can never pass as an access token and vice versa.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use quill_core::UserId;
use quill_core::config::AuthConfig;
use quill_core::error::AppError;

use super::claims::{Claims, TokenKind};
use crate::UNAUTHORIZED;

/// A freshly signed token and the moment it stops verifying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedToken {
    /// The compact JWT string.
    pub token: String,
    /// Cryptographic expiry.
    pub expires_at: DateTime<Utc>,
}

/// Access + refresh tokens minted together for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access: IssuedToken,
    /// Long-lived refresh token.
    pub refresh: IssuedToken,
}

/// Signing material for one token kind.
#[derive(Clone)]
struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SigningKeys {
    fn new(secret: &str, ttl_minutes: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::minutes(ttl_minutes as i64),
        }
    }
}

/// Issues and verifies the two token kinds from injected secrets.
///
/// Built once at startup from [`AuthConfig`] and shared read-only.
#[derive(Clone)]
pub struct TokenSigner {
    access: SigningKeys,
    refresh: SigningKeys,
    validation: Validation,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("access_ttl", &self.access.ttl)
            .field("refresh_ttl", &self.refresh.ttl)
            .finish()
    }
}

impl TokenSigner {
    /// Creates a signer from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            access: SigningKeys::new(
                &config.access_token_secret,
                config.access_token_ttl_minutes,
            ),
            refresh: SigningKeys::new(
                &config.refresh_token_secret,
                config.refresh_token_ttl_minutes,
            ),
            validation,
        }
    }

    /// Signs an access token for `user_id`.
    pub fn sign_access(&self, user_id: UserId) -> Result<IssuedToken, AppError> {
        self.sign_at(TokenKind::Access, user_id, Utc::now())
    }

    /// Signs a refresh token for `user_id`.
    pub fn sign_refresh(&self, user_id: UserId) -> Result<IssuedToken, AppError> {
        self.sign_at(TokenKind::Refresh, user_id, Utc::now())
    }

    /// Signs both tokens for `user_id` at the same instant.
    pub fn issue_pair(&self, user_id: UserId) -> Result<TokenPair, AppError> {
        let now = Utc::now();
        Ok(TokenPair {
            access: self.sign_at(TokenKind::Access, user_id, now)?,
            refresh: self.sign_at(TokenKind::Refresh, user_id, now)?,
        })
    }

    /// Verifies an access token and returns its identity.
    pub fn verify_access(&self, token: &str) -> Result<UserId, AppError> {
        self.verify(TokenKind::Access, token)
    }

    /// Verifies a refresh token and returns its identity.
    pub fn verify_refresh(&self, token: &str) -> Result<UserId, AppError> {
        self.verify(TokenKind::Refresh, token)
    }

    fn keys(&self, kind: TokenKind) -> &SigningKeys {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    fn sign_at(
        &self,
        kind: TokenKind,
        user_id: UserId,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, AppError> {
        let keys = self.keys(kind);
        let expires_at = issued_at + keys.ttl;

        let claims = Claims {
            sub: user_id,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding).map_err(
            |e| AppError::internal(format!("Failed to encode {} token: {e}", kind.as_str())),
        )?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Bad signature, wrong secret, malformed input, and expiry all collapse
    /// into the same error.
    fn verify(&self, kind: TokenKind, token: &str) -> Result<UserId, AppError> {
        decode::<Claims>(token, &self.keys(kind).decoding, &self.validation)
            .map(|data| data.claims.sub)
            .map_err(|e| {
                debug!(kind = kind.as_str(), reason = ?e.kind(), "Token rejected");
                AppError::unauthorized(UNAUTHORIZED)
            })
    }
}
