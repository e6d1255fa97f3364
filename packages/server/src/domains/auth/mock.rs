//! In-memory auth backend for local development.
//!
//! Mirrors the Postgres implementation's state machine without a database
//! or an SMS account: codes are generated the same way, logged instead of
//! sent, and checked against the same match/expiry rules. Selected with
//! `AUTH_BACKEND=mock`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::common::validate_mobile_number;
use crate::domains::auth::errors::AuthError;
use crate::domains::auth::jwt::{Claims, JwtService};
use crate::domains::auth::models::User;
use crate::domains::auth::otp::{generate_otp_code, otp_expiry};
use crate::domains::auth::service::{AuthBackend, AuthSession};

#[derive(Debug, Clone)]
struct MockAccount {
    id: i64,
    code: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    verified: bool,
}

pub struct MockAuthBackend {
    jwt: Arc<JwtService>,
    accounts: Mutex<HashMap<String, MockAccount>>,
    next_id: AtomicI64,
}

impl MockAuthBackend {
    pub fn new(jwt: Arc<JwtService>) -> Self {
        Self {
            jwt,
            accounts: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn synthesize_user(&self, account: &MockAccount, mobile_number: &str) -> User {
        let now = Utc::now();
        User {
            id: account.id,
            mobile_number: mobile_number.to_string(),
            otp: None,
            otp_expires_at: None,
            is_verified: account.verified,
            name: None,
            address_line1: None,
            address_line2: None,
            city: None,
            state: None,
            pincode: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[async_trait]
impl AuthBackend for MockAuthBackend {
    async fn request_code(&self, mobile_number: &str) -> Result<(), AuthError> {
        let mobile_number = validate_mobile_number(mobile_number).map_err(AuthError::Validation)?;

        let code = generate_otp_code();
        let expires_at = otp_expiry();

        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .entry(mobile_number.to_string())
            .or_insert_with(|| MockAccount {
                id: self.next_id.fetch_add(1, Ordering::SeqCst),
                code: None,
                expires_at: None,
                verified: false,
            });
        account.code = Some(code.clone());
        account.expires_at = Some(expires_at);

        info!("[mock auth] OTP for {}: {}", mobile_number, code);
        Ok(())
    }

    async fn verify_code(&self, mobile_number: &str, code: &str) -> Result<AuthSession, AuthError> {
        let mobile_number = validate_mobile_number(mobile_number).map_err(AuthError::Validation)?;
        if code.is_empty() {
            return Err(AuthError::Validation("otp is required".to_string()));
        }

        let mut accounts = self.accounts.lock().unwrap();
        let Some(account) = accounts.get_mut(mobile_number) else {
            return Err(AuthError::InvalidCredentials);
        };

        let (Some(stored), Some(expires_at)) = (account.code.clone(), account.expires_at) else {
            return Err(AuthError::InvalidCredentials);
        };

        if stored != code {
            return Err(AuthError::InvalidCredentials);
        }

        if Utc::now() > expires_at {
            account.code = None;
            account.expires_at = None;
            return Err(AuthError::InvalidCredentials);
        }

        account.code = None;
        account.expires_at = None;
        account.verified = true;

        let user = self.synthesize_user(account, mobile_number);
        drop(accounts);

        let token = self
            .jwt
            .create_token(user.id, user.mobile_number.clone())
            .map_err(AuthError::Internal)?;
        Ok(AuthSession { token, user })
    }

    async fn get_session(&self, token: &str) -> Result<Claims, AuthError> {
        self.jwt
            .verify_token(token)
            .map_err(|_| AuthError::Unauthenticated)
    }
}
