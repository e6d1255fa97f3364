use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;

/// Development-only signing secret. Production refuses to start with it.
pub const DEV_JWT_SECRET: &str = "drybite-dev-secret-do-not-use";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

/// Which auth backend to run: the Postgres-backed OTP service or the
/// in-memory mock (local development without a Twilio account).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthBackendKind {
    Postgres,
    Mock,
}

#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub per_second: u64,
    pub burst: u32,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub app_env: AppEnv,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub auth_backend: AuthBackendKind,
    pub twilio: Option<TwilioConfig>,
    pub allowed_origins: Vec<String>,
    /// Rate limiting is off unless explicitly configured.
    pub rate_limit: Option<RateLimitConfig>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let app_env = match env::var("APP_ENV").as_deref() {
            Ok("production") => AppEnv::Production,
            _ => AppEnv::Development,
        };

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => {
                if app_env == AppEnv::Production && secret == DEV_JWT_SECRET {
                    bail!("JWT_SECRET is set to the development default; refusing to start in production");
                }
                secret
            }
            Err(_) => {
                if app_env == AppEnv::Production {
                    bail!("JWT_SECRET must be set in production");
                }
                tracing::warn!(
                    "JWT_SECRET not set; falling back to the development secret. \
                     Tokens signed with it are worthless outside local development."
                );
                DEV_JWT_SECRET.to_string()
            }
        };

        let auth_backend = match env::var("AUTH_BACKEND").as_deref() {
            Ok("mock") => AuthBackendKind::Mock,
            _ => AuthBackendKind::Postgres,
        };

        // Twilio credentials are optional as a set; without them the server
        // logs codes to the console instead of sending SMS.
        let twilio = match (
            env::var("TWILIO_ACCOUNT_SID"),
            env::var("TWILIO_AUTH_TOKEN"),
            env::var("TWILIO_FROM_NUMBER"),
        ) {
            (Ok(account_sid), Ok(auth_token), Ok(from_number)) => Some(TwilioConfig {
                account_sid,
                auth_token,
                from_number,
            }),
            _ => None,
        };

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let rate_limit = match env::var("RATE_LIMIT_PER_SECOND") {
            Ok(per_second) => Some(RateLimitConfig {
                per_second: per_second
                    .parse()
                    .context("RATE_LIMIT_PER_SECOND must be a valid number")?,
                burst: env::var("RATE_LIMIT_BURST")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .context("RATE_LIMIT_BURST must be a valid number")?,
            }),
            Err(_) => None,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            app_env,
            jwt_secret,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "drybite-api".to_string()),
            auth_backend,
            twilio,
            allowed_origins,
            rate_limit,
        })
    }
}
