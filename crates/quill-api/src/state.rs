//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use quill_auth::SessionProtocol;
use quill_core::config::AppConfig;

use crate::cookies::CookieSettings;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Register, login, logout, refresh, and the gate check
    pub protocol: Arc<SessionProtocol>,
    /// Attributes applied to both session cookies
    pub cookies: CookieSettings,
}

impl AppState {
    /// Builds state from loaded configuration and a wired protocol.
    pub fn new(config: Arc<AppConfig>, protocol: Arc<SessionProtocol>) -> Self {
        let cookies = CookieSettings::from_config(&config.auth);
        Self {
            config,
            protocol,
            cookies,
        }
    }
}
