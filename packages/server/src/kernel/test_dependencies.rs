// MockSmsService - capturing SMS mock for tests
//
// Records every (mobile_number, code) pair instead of sending anything, so
// tests can read back the code the service issued.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::traits::BaseSmsService;

#[derive(Clone, Default)]
pub struct MockSmsService {
    sent: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockSmsService {
    pub fn new() -> Self {
        Self::default()
    }

    /// All (mobile_number, code) pairs sent so far, oldest first.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// The most recent code sent to `mobile_number`, if any.
    pub fn last_code_for(&self, mobile_number: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == mobile_number)
            .map(|(_, code)| code.clone())
    }
}

#[async_trait]
impl BaseSmsService for MockSmsService {
    async fn send_code(&self, mobile_number: &str, code: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((mobile_number.to_string(), code.to_string()));
        Ok(())
    }
}
