// DryBite Foods - API Core
//
// Backend service for the DryBite storefront. Owns the mobile-number/OTP
// authentication lifecycle: code issuance with expiry, transactional
// verification, JWT session issuance, and bearer-token session consumption
// on protected endpoints.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
