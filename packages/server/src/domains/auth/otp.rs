//! OTP code generation and expiry policy.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

/// Codes are 6 decimal digits, zero-padded.
pub const OTP_LENGTH: usize = 6;

/// A code is valid for 5 minutes from issuance.
pub const OTP_TTL_MINUTES: i64 = 5;

/// Generate a random 6-digit verification code.
///
/// `thread_rng` is a CSPRNG; codes cover the full 000000-999999 space.
pub fn generate_otp_code() -> String {
    let code: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:06}", code)
}

/// Absolute expiry for a code issued now.
pub fn otp_expiry() -> DateTime<Utc> {
    Utc::now() + Duration::minutes(OTP_TTL_MINUTES)
}
