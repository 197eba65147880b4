//! The session gate for protected routes.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;

use quill_core::error::AppError;

use crate::cookies;
use crate::extractors::CurrentUser;
use crate::state::AppState;

/// Rejects the request unless both session cookies are present and the access
/// token verifies for an existing user.
///
/// On success the filtered user view is attached to the request as
/// [`CurrentUser`]. An expired access token is not renewed here.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = state
        .protocol
        .authenticate(cookies::access_token(&jar), cookies::refresh_token(&jar))
        .await?;

    tracing::debug!(user_id = %user.id, "Session gate passed");
    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}
