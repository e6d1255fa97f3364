//! OTP issuance and verification service.
//!
//! One `AuthBackend` implementation talks to Postgres (`OtpAuthService`);
//! the other is the in-memory mock in `mock.rs`. Callers only ever see the
//! trait.

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use crate::common::validate_mobile_number;
use crate::domains::auth::errors::AuthError;
use crate::domains::auth::jwt::{Claims, JwtService};
use crate::domains::auth::models::User;
use crate::domains::auth::otp::{generate_otp_code, otp_expiry};
use crate::kernel::{is_transient, with_retry, BaseSmsService};

/// Issued on successful verification: a signed token plus the account it
/// identifies.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

/// Why a verification was rejected. Logged server-side only; the API
/// response is uniform across all variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    UnknownNumber,
    NoOutstandingCode,
    Mismatch,
    Expired,
}

/// Result of a verification attempt against the store.
#[derive(Debug)]
pub enum VerifyOutcome {
    Verified(User),
    Rejected(RejectReason),
}

/// The authentication capability set: request a code, verify a code, read
/// back a session. Implementations are swappable at startup.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Issue a fresh code for `mobile_number` and hand it to the delivery
    /// collaborator. Overwrites any outstanding code.
    async fn request_code(&self, mobile_number: &str) -> Result<(), AuthError>;

    /// Check a candidate code. On success the account is verified, the code
    /// consumed, and a session token minted.
    async fn verify_code(&self, mobile_number: &str, code: &str) -> Result<AuthSession, AuthError>;

    /// Validate an inbound token and return its claims.
    async fn get_session(&self, token: &str) -> Result<Claims, AuthError>;
}

// =============================================================================
// Postgres-backed implementation
// =============================================================================

pub struct OtpAuthService {
    pool: PgPool,
    sms: Arc<dyn BaseSmsService>,
    jwt: Arc<JwtService>,
}

impl OtpAuthService {
    pub fn new(pool: PgPool, sms: Arc<dyn BaseSmsService>, jwt: Arc<JwtService>) -> Self {
        Self { pool, sms, jwt }
    }

    /// Classify a storage error once retries are exhausted: transient
    /// classes surface as service-unavailable, everything else as a
    /// database error. Neither reaches the caller with detail attached.
    fn map_storage(err: sqlx::Error) -> AuthError {
        if is_transient(&err) {
            AuthError::Unavailable
        } else {
            AuthError::Database(err)
        }
    }

    /// Run the verification transaction and report the detailed outcome.
    ///
    /// The row is locked with `FOR UPDATE`, so issuance and verification
    /// for the same number serialize at the row. Checks run in a fixed
    /// order: existence, outstanding code, exact match, expiry. An expired
    /// code is cleared in the same transaction, which is what makes a
    /// retried verification against it fail closed.
    pub async fn verify_code_detailed(
        &self,
        mobile_number: &str,
        code: &str,
    ) -> Result<VerifyOutcome, AuthError> {
        let mobile_number = validate_mobile_number(mobile_number).map_err(AuthError::Validation)?;
        if code.is_empty() {
            return Err(AuthError::Validation("otp is required".to_string()));
        }

        let outcome = with_retry("verify_otp", || {
            let pool = self.pool.clone();
            async move {
                let mut tx = pool.begin().await?;

                let Some(user) = User::find_by_mobile_for_update(mobile_number, &mut tx).await?
                else {
                    return Ok(VerifyOutcome::Rejected(RejectReason::UnknownNumber));
                };

                let (Some(stored), Some(expires_at)) = (user.otp.clone(), user.otp_expires_at)
                else {
                    return Ok(VerifyOutcome::Rejected(RejectReason::NoOutstandingCode));
                };

                if stored != code {
                    return Ok(VerifyOutcome::Rejected(RejectReason::Mismatch));
                }

                if Utc::now() > expires_at {
                    // Expired codes cannot be retried.
                    User::clear_otp(user.id, &mut tx).await?;
                    tx.commit().await?;
                    return Ok(VerifyOutcome::Rejected(RejectReason::Expired));
                }

                let updated = User::mark_verified(user.id, &mut tx).await?;
                tx.commit().await?;
                Ok(VerifyOutcome::Verified(updated))
            }
        })
        .await
        .map_err(Self::map_storage)?;

        Ok(outcome)
    }
}

#[async_trait]
impl AuthBackend for OtpAuthService {
    async fn request_code(&self, mobile_number: &str) -> Result<(), AuthError> {
        let mobile_number = validate_mobile_number(mobile_number).map_err(AuthError::Validation)?;

        let code = generate_otp_code();
        let expires_at = otp_expiry();

        let user = with_retry("issue_otp", || {
            let pool = self.pool.clone();
            let code = code.clone();
            async move {
                let mut tx = pool.begin().await?;
                let user = match User::find_by_mobile_for_update(mobile_number, &mut tx).await? {
                    Some(existing) => User::set_otp(existing.id, &code, expires_at, &mut tx).await?,
                    None => User::upsert_otp(mobile_number, &code, expires_at, &mut tx).await?,
                };
                tx.commit().await?;
                Ok(user)
            }
        })
        .await
        .map_err(Self::map_storage)?;

        self.sms
            .send_code(mobile_number, &code)
            .await
            .map_err(|e| AuthError::Internal(anyhow!("failed to deliver OTP: {e}")))?;

        info!(user_id = user.id, "OTP issued");
        Ok(())
    }

    async fn verify_code(&self, mobile_number: &str, code: &str) -> Result<AuthSession, AuthError> {
        match self.verify_code_detailed(mobile_number, code).await? {
            VerifyOutcome::Verified(user) => {
                let token = self
                    .jwt
                    .create_token(user.id, user.mobile_number.clone())
                    .map_err(AuthError::Internal)?;
                info!(user_id = user.id, "OTP verified");
                Ok(AuthSession { token, user })
            }
            VerifyOutcome::Rejected(reason) => {
                info!(?reason, "OTP verification rejected");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    async fn get_session(&self, token: &str) -> Result<Claims, AuthError> {
        self.jwt
            .verify_token(token)
            .map_err(|_| AuthError::Unauthenticated)
    }
}
