//! Users domain - profile reads and updates for authenticated accounts.
//!
//! OTP state lives in the auth domain; profile flows never touch the code
//! columns or the verified flag.

use anyhow::Result;
use sqlx::PgPool;

use crate::domains::auth::models::{ProfileUpdate, User};

/// Fetch the account behind an authenticated session.
pub async fn get_profile(user_id: i64, pool: &PgPool) -> Result<Option<User>> {
    User::find_by_id(user_id, pool).await
}

/// Apply a partial profile update and return the fresh row.
pub async fn update_profile(user_id: i64, update: ProfileUpdate, pool: &PgPool) -> Result<User> {
    User::update_profile(user_id, update, pool).await
}
