//! Role gates layered on [`AuthUser`].
//!
//! Reads are open to any signed-in user. Content writes need an instructor
//! or admin, and account or roster management is admin only.
//!
//! ```ignore
//! async fn create(RequireInstructor(user): RequireInstructor) -> AppResult<StatusCode> { .. }
//! ```

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tnc_core::error::CoreError;
use tnc_core::roles::Role;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticate, then reject with 403 unless `admits` accepts the role.
async fn authorize(
    parts: &mut Parts,
    state: &AppState,
    admits: fn(Role) -> bool,
    denied: &'static str,
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if admits(user.role) {
        Ok(user)
    } else {
        Err(AppError::Core(CoreError::Forbidden(denied.into())))
    }
}

/// Any authenticated user.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(parts, state, |_| true, "").await.map(RequireAuth)
    }
}

/// `instructor` or `admin`.
pub struct RequireInstructor(pub AuthUser);

impl FromRequestParts<AppState> for RequireInstructor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(
            parts,
            state,
            Role::can_manage_content,
            "Instructor or Admin role required",
        )
        .await
        .map(RequireInstructor)
    }
}

/// `admin` only.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(parts, state, Role::is_admin, "Admin role required")
            .await
            .map(RequireAdmin)
    }
}
