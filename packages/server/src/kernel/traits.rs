// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Naming convention: Base* for trait names.

use anyhow::Result;
use async_trait::async_trait;

// =============================================================================
// SMS Service Trait (Infrastructure - out-of-band OTP delivery)
// =============================================================================

/// Delivers a one-time code to a mobile number. The auth core never knows
/// how the code travels; implementations cover Twilio SMS, console logging
/// for development, and a capturing mock for tests.
#[async_trait]
pub trait BaseSmsService: Send + Sync {
    /// Send `code` to `mobile_number` out of band.
    async fn send_code(&self, mobile_number: &str, code: &str) -> Result<()>;
}
