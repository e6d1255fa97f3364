//! Auth domain - mobile-number/OTP authentication
//!
//! Responsibilities:
//! - OTP issuance: generate a 6-digit code, persist it against the mobile
//!   number with a 5-minute expiry, deliver it out of band
//! - OTP verification: atomic match + expiry check, flipping the account
//!   to verified and invalidating the code
//! - Session/JWT token management
//!
//! The `AuthBackend` trait is the single entry point; the Postgres-backed
//! `OtpAuthService` and the in-memory `MockAuthBackend` are selected by
//! configuration at startup.

pub mod errors;
pub mod jwt;
pub mod mock;
pub mod models;
pub mod otp;
pub mod service;

pub use errors::AuthError;
pub use jwt::{Claims, JwtService};
pub use mock::MockAuthBackend;
pub use service::{AuthBackend, AuthSession, OtpAuthService, RejectReason, VerifyOutcome};
