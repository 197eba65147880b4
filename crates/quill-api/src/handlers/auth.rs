//! Session handlers: register, login, logout, refresh, me.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;

use quill_core::error::AppError;

use crate::cookies;
use crate::dto::request::{LoginRequest, RegisterRequest};
use crate::dto::response::SessionResponse;
use crate::extractors::{CurrentUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/v1/register
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<SessionResponse>), AppError> {
    let grant = state.protocol.register(req.into()).await?;

    let jar = cookies::set_session_cookies(jar, &grant.tokens, &state.cookies);
    Ok((
        StatusCode::CREATED,
        jar,
        Json(SessionResponse::authenticated(grant.user)),
    ))
}

/// POST /api/v1/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>), AppError> {
    let grant = state.protocol.login(&req.username, &req.password).await?;

    let jar = cookies::set_session_cookies(jar, &grant.tokens, &state.cookies);
    Ok((jar, Json(SessionResponse::authenticated(grant.user))))
}

/// POST /api/v1/logout
///
/// Not gated: an expired access token must not keep the refresh record alive.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<SessionResponse>), AppError> {
    state.protocol.logout(cookies::refresh_token(&jar)).await?;
    tracing::debug!("Session cookies cleared");

    Ok((
        cookies::clear_session_cookies(jar),
        Json(SessionResponse::signed_out()),
    ))
}

/// GET /api/v1/refresh
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<SessionResponse>), AppError> {
    let grant = state
        .protocol
        .refresh(cookies::refresh_token(&jar))
        .await?;

    let jar = cookies::set_session_cookies(jar, &grant.tokens, &state.cookies);
    Ok((jar, Json(SessionResponse::authenticated(grant.user))))
}

/// GET /api/v1/me
pub async fn me(CurrentUser(user): CurrentUser) -> Json<SessionResponse> {
    Json(SessionResponse::authenticated(user))
}
