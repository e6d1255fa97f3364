//! Kernel module - server infrastructure and dependencies.

pub mod retry;
pub mod sms;
pub mod test_dependencies;
pub mod traits;

pub use retry::{is_transient, with_retry};
pub use sms::{ConsoleSmsSender, TwilioSmsAdapter};
pub use test_dependencies::MockSmsService;
pub use traits::*;
