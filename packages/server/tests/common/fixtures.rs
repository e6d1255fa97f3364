//! Shared fixtures for integration tests.

use anyhow::Result;
use sqlx::PgPool;
use std::sync::atomic::{AtomicU64, Ordering};

use server_core::domains::auth::models::User;

static NEXT_MOBILE: AtomicU64 = AtomicU64::new(1);

/// A mobile number no other test in this binary has used.
pub fn unique_mobile() -> String {
    let n = NEXT_MOBILE.fetch_add(1, Ordering::SeqCst);
    format!("+9198000{:05}", n)
}

/// Read back the row for a number, if any.
pub async fn fetch_user(pool: &PgPool, mobile_number: &str) -> Result<Option<User>> {
    User::find_by_mobile(mobile_number, pool).await
}

/// Push the outstanding code's expiry into the past, simulating the clock
/// running past the window.
pub async fn force_expire_otp(pool: &PgPool, mobile_number: &str) -> Result<()> {
    sqlx::query(
        "UPDATE users SET otp_expires_at = now() - interval '1 minute' WHERE mobile_number = $1",
    )
    .bind(mobile_number)
    .execute(pool)
    .await?;
    Ok(())
}
