//! Gateway-supplied identity extractors for Axum handlers.
//!
//! Authentication happens upstream; the gateway forwards the caller's id
//! and role as `x-user-id` / `x-user-role`. These extractors only parse
//! those headers.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use mindak_core::error::CoreError;
use mindak_core::types::DbId;

use crate::error::AppError;

/// Header carrying the authenticated user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the authenticated user's role name.
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Authenticated user extracted from the identity headers.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    /// Role name (e.g. `"admin"`, `"user"`).
    pub role: String,
}

impl AuthUser {
    /// Parse the identity headers. `Ok(None)` when no identity was sent at
    /// all; an error when it was sent but is malformed.
    fn from_parts(parts: &Parts) -> Result<Option<Self>, AppError> {
        let Some(raw_id) = parts.headers.get(USER_ID_HEADER) else {
            return Ok(None);
        };

        let user_id = raw_id
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse::<DbId>().ok())
            .filter(|id| *id > 0)
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(format!(
                    "Invalid {USER_ID_HEADER} header"
                )))
            })?;

        let role = parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_ascii_lowercase())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(format!(
                    "Missing {USER_ROLE_HEADER} header"
                )))
            })?;

        Ok(Some(AuthUser { user_id, role }))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        AuthUser::from_parts(parts)?.ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(format!(
                "Missing {USER_ID_HEADER} header"
            )))
        })
    }
}

/// The caller's identity if one was forwarded. Client endpoints accept
/// anonymous submissions; a malformed identity is still ignored rather than
/// blocking the client.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<AuthUser>);

impl MaybeUser {
    pub fn user_id(&self) -> Option<DbId> {
        self.0.as_ref().map(|u| u.user_id)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(AuthUser::from_parts(parts).ok().flatten()))
    }
}
