//! # quill-api
//!
//! HTTP API layer for Quill built on Axum.
//!
//! Provides the `/api/v1` session endpoints, the cookie-based session gate,
//! request validation, and DTOs. Error rendering comes from
//! `quill-core` with its `axum` feature.

pub mod app;
pub mod cookies;
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use state::AppState;
