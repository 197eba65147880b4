//! `CurrentUser` extractor: the identity attached by the session gate.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use quill_auth::UNAUTHORIZED;
use quill_core::error::AppError;
use quill_entity::user::UserView;

/// The authenticated user for this request.
///
/// Only available on routes behind
/// [`require_session`](crate::middleware::auth::require_session); elsewhere
/// extraction fails with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserView);

impl std::ops::Deref for CurrentUser {
    type Target = UserView;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized(UNAUTHORIZED))
    }
}
