//! Session flows and background maintenance.

pub mod cleanup;
pub mod protocol;

pub use cleanup::TokenCleanup;
pub use protocol::{NewAccount, SessionGrant, SessionProtocol};
