//! # quill-auth
//!
//! The authentication and session subsystem for Quill.
//!
//! ## Modules
//!
//! - `jwt`: access/refresh token signing and verification with two secrets
//! - `password`: Argon2id password hashing
//! - `store`: user and refresh-token persistence traits (Postgres + in-memory)
//! - `session`: register/login/logout/refresh flows, the request gate check,
//!   and expired-token cleanup

pub mod jwt;
pub mod password;
pub mod session;
pub mod store;

pub use jwt::{Claims, IssuedToken, TokenPair, TokenSigner};
pub use password::PasswordHasher;
pub use session::{NewAccount, SessionGrant, SessionProtocol, TokenCleanup};
pub use store::{RefreshTokenStore, UserStore};

/// The only message ever returned for a token or cookie failure.
pub const UNAUTHORIZED: &str = "Unauthorized";
