//! Route definitions for the Quill HTTP API.
//!
//! All routes are mounted under `/api/v1`. Only `/me` sits behind the
//! [`require_session`](crate::middleware::auth::require_session) gate.
//! Refresh and logout work from the refresh cookie alone, so both stay
//! reachable once the access token has expired.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the `/api/v1` router with its state applied.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(public_routes())
        .merge(session_routes(state.clone()));

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Register, login, refresh, logout, health
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/refresh", get(handlers::auth::refresh))
        .route("/logout", post(handlers::auth::logout))
        .route("/health", get(handlers::health::health))
}

/// Me, behind the gate
fn session_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(handlers::auth::me))
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::auth::require_session,
        ))
}
