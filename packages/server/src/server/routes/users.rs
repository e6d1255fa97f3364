use axum::{extract::Extension, Json};

use crate::domains::auth::models::{ProfileUpdate, User};
use crate::domains::auth::AuthError;
use crate::domains::users;
use crate::server::app::AppState;
use crate::server::middleware::AuthUser;
use crate::server::routes::ApiError;

/// GET /api/users/me
///
/// Returns the account behind the bearer token.
pub async fn me_handler(
    Extension(state): Extension<AppState>,
    auth_user: Option<Extension<AuthUser>>,
) -> Result<Json<User>, ApiError> {
    let Some(Extension(auth_user)) = auth_user else {
        return Err(AuthError::Unauthenticated.into());
    };

    let user = users::get_profile(auth_user.user_id, &state.db_pool)
        .await
        .map_err(AuthError::Internal)?
        .ok_or(AuthError::Unauthenticated)?;

    Ok(Json(user))
}

/// PUT /api/users/profile
///
/// Partial update: absent fields are left untouched.
pub async fn update_profile_handler(
    Extension(state): Extension<AppState>,
    auth_user: Option<Extension<AuthUser>>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<User>, ApiError> {
    let Some(Extension(auth_user)) = auth_user else {
        return Err(AuthError::Unauthenticated.into());
    };

    let user = users::update_profile(auth_user.user_id, update, &state.db_pool)
        .await
        .map_err(AuthError::Internal)?;

    Ok(Json(user))
}
