//! Bounded retry for transient database failures.
//!
//! Only recognized transient error classes are retried: connection loss,
//! pool exhaustion, and Postgres serialization/deadlock failures. Business
//! rejections and all other errors propagate immediately.

use std::future::Future;
use std::time::Duration;

const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_STEP_MS: u64 = 200;

/// Whether an error is worth retrying.
///
/// Postgres codes: 40001 serialization_failure, 40P01 deadlock_detected,
/// 57P01 admin_shutdown (connection being torn down under us).
pub fn is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut => true,
        sqlx::Error::Database(db) => matches!(
            db.code().as_deref(),
            Some("40001") | Some("40P01") | Some("57P01")
        ),
        _ => false,
    }
}

/// Run `op` up to three times with linear backoff between attempts.
///
/// `op` must be safe to re-run from scratch: each attempt opens its own
/// transaction, so a failed attempt leaves no partial state behind.
pub async fn with_retry<T, F, Fut>(op_name: &str, mut op: F) -> sqlx::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = sqlx::Result<T>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if is_transient(&err) && attempt < MAX_ATTEMPTS => {
                tracing::warn!(
                    operation = op_name,
                    attempt,
                    error = %err,
                    "Transient database error, retrying"
                );
                tokio::time::sleep(Duration::from_millis(BACKOFF_STEP_MS * attempt as u64)).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
