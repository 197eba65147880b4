//! # quill-core
//!
//! Core crate for Quill. Contains configuration schemas, typed identifiers,
//! and the unified error system.
//!
//! With the `axum` feature enabled, [`AppError`] also renders itself as a
//! JSON HTTP response (see [`http_error`]).
//!
//! This crate has **no** internal dependencies on other Quill crates.

pub mod config;
pub mod error;
#[cfg(feature = "axum")]
pub mod http_error;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
pub use types::UserId;
