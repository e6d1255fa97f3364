//! SMS sender implementations behind the `BaseSmsService` trait.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use twilio::TwilioService;

use crate::domains::auth::otp::OTP_TTL_MINUTES;
use crate::kernel::traits::BaseSmsService;

// =============================================================================
// TwilioService Adapter (implements BaseSmsService trait)
// =============================================================================

/// Wrapper around TwilioService that implements the BaseSmsService trait
pub struct TwilioSmsAdapter(pub Arc<TwilioService>);

impl TwilioSmsAdapter {
    pub fn new(service: Arc<TwilioService>) -> Self {
        Self(service)
    }
}

#[async_trait]
impl BaseSmsService for TwilioSmsAdapter {
    async fn send_code(&self, mobile_number: &str, code: &str) -> Result<()> {
        let body = format!(
            "Your DryBite verification code is {}. It expires in {} minutes.",
            code, OTP_TTL_MINUTES
        );
        self.0
            .send_sms(mobile_number, &body)
            .await
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!("{}", e))
    }
}

// =============================================================================
// Console Sender (development without Twilio credentials)
// =============================================================================

/// Logs the code instead of sending it. Selected automatically when no
/// Twilio credentials are configured.
pub struct ConsoleSmsSender;

#[async_trait]
impl BaseSmsService for ConsoleSmsSender {
    async fn send_code(&self, mobile_number: &str, code: &str) -> Result<()> {
        tracing::info!("[console sms] OTP for {}: {}", mobile_number, code);
        Ok(())
    }
}
