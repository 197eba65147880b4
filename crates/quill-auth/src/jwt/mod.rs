//! JWT token signing, verification, and claims.

pub mod claims;
pub mod signer;

pub use claims::{Claims, TokenKind};
pub use signer::{IssuedToken, TokenPair, TokenSigner};
