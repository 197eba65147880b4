//! Authentication configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Token signing, cookie transport, and password hashing configuration.
///
/// The two signing secrets have no defaults: they must be supplied at
/// startup and must differ, otherwise [`AuthConfig::validate`] fails and the
/// process refuses to boot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC-SHA256 secret for access tokens.
    #[serde(default, skip_serializing)]
    pub access_token_secret: String,
    /// HMAC-SHA256 secret for refresh tokens.
    #[serde(default, skip_serializing)]
    pub refresh_token_secret: String,
    /// Access token lifetime in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_minutes: u64,
    /// Refresh token lifetime in minutes.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_minutes: u64,
    /// Client-side cookie `Max-Age` in hours, independent of token expiry.
    #[serde(default = "default_cookie_max_age")]
    pub cookie_max_age_hours: u64,
    /// Whether session cookies carry the `Secure` attribute.
    #[serde(default)]
    pub cookie_secure: bool,
    /// Argon2 memory cost in KiB.
    #[serde(default = "default_password_memory")]
    pub password_memory_kib: u32,
    /// Argon2 iteration count.
    #[serde(default = "default_password_iterations")]
    pub password_iterations: u32,
    /// Argon2 degree of parallelism.
    #[serde(default = "default_password_parallelism")]
    pub password_parallelism: u32,
    /// Interval between expired refresh-token purges, in seconds (0 disables).
    #[serde(default = "default_cleanup_interval")]
    pub token_cleanup_interval_seconds: u64,
}

impl AuthConfig {
    /// Enforces the secret rules and non-zero lifetimes.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.access_token_secret.trim().is_empty() {
            return Err(AppError::configuration(
                "auth.access_token_secret must be set",
            ));
        }
        if self.refresh_token_secret.trim().is_empty() {
            return Err(AppError::configuration(
                "auth.refresh_token_secret must be set",
            ));
        }
        if self.access_token_secret == self.refresh_token_secret {
            return Err(AppError::configuration(
                "auth.access_token_secret and auth.refresh_token_secret must differ",
            ));
        }
        if self.access_token_ttl_minutes == 0 || self.refresh_token_ttl_minutes == 0 {
            return Err(AppError::configuration("token lifetimes must be non-zero"));
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: String::new(),
            refresh_token_secret: String::new(),
            access_token_ttl_minutes: default_access_ttl(),
            refresh_token_ttl_minutes: default_refresh_ttl(),
            cookie_max_age_hours: default_cookie_max_age(),
            cookie_secure: false,
            password_memory_kib: default_password_memory(),
            password_iterations: default_password_iterations(),
            password_parallelism: default_password_parallelism(),
            token_cleanup_interval_seconds: default_cleanup_interval(),
        }
    }
}

fn default_access_ttl() -> u64 {
    30
}

fn default_refresh_ttl() -> u64 {
    60
}

fn default_cookie_max_age() -> u64 {
    24
}

fn default_password_memory() -> u32 {
    19_456
}

fn default_password_iterations() -> u32 {
    2
}

fn default_password_parallelism() -> u32 {
    1
}

fn default_cleanup_interval() -> u64 {
    900
}
