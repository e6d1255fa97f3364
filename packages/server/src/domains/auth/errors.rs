use thiserror::Error;

/// Auth failures, classified for the API boundary.
///
/// Business rejections are deliberately uniform: the caller learns that the
/// credentials were invalid, never whether the number was unknown, the code
/// wrong, or the code expired. That detail is logged server-side only.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid or expired OTP")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Service temporarily unavailable")]
    Unavailable,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
