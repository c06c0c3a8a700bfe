//! Caller identity extractor.
//!
//! Authentication happens upstream; the gateway forwards the authenticated
//! user's id in the `x-user-id` header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderName;

use dropdeck_core::error::CoreError;
use dropdeck_core::types::DbId;
use dropdeck_db::repositories::UserRepo;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the caller's user id.
pub const ACTING_USER_HEADER: HeaderName = HeaderName::from_static("x-user-id");

/// The user on whose behalf a request is made.
///
/// ```ignore
/// async fn my_handler(user: ActingUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ActingUser {
    pub user_id: DbId,
}

impl FromRequestParts<AppState> for ActingUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(&ACTING_USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("Missing x-user-id header".into()))
            })?;

        let user_id: DbId = raw.trim().parse().map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid x-user-id header".into()))
        })?;

        if !UserRepo::exists(&state.pool, user_id).await? {
            return Err(AppError::Core(CoreError::Unauthorized(format!(
                "Unknown user {user_id}"
            ))));
        }

        Ok(ActingUser { user_id })
    }
}
