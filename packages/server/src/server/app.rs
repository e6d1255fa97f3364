//! Application setup and server configuration.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use twilio::{TwilioOptions, TwilioService};

use crate::config::{AuthBackendKind, Config};
use crate::domains::auth::{AuthBackend, JwtService, MockAuthBackend, OtpAuthService};
use crate::kernel::{BaseSmsService, ConsoleSmsSender, TwilioSmsAdapter};
use crate::server::middleware::{extract_client_ip, jwt_auth_middleware};
use crate::server::routes::{
    database_diagnostics_handler, health_handler, me_handler, send_otp_handler,
    update_profile_handler, verify_otp_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth: Arc<dyn AuthBackend>,
    pub jwt_service: Arc<JwtService>,
    pub started_at: Instant,
}

/// Requests are given a bounded window before the server aborts them.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Build the Axum application router with the SMS sender chosen from
/// configuration: Twilio when credentials are present, console otherwise.
pub fn build_app(pool: PgPool, config: &Config) -> Router {
    let sms: Arc<dyn BaseSmsService> = match &config.twilio {
        Some(twilio_config) => {
            let twilio = Arc::new(TwilioService::new(TwilioOptions {
                account_sid: twilio_config.account_sid.clone(),
                auth_token: twilio_config.auth_token.clone(),
                from_number: twilio_config.from_number.clone(),
            }));
            Arc::new(TwilioSmsAdapter::new(twilio))
        }
        None => {
            tracing::warn!("No Twilio credentials configured; OTP codes will be logged, not sent");
            Arc::new(ConsoleSmsSender)
        }
    };

    build_app_with_sms(pool, config, sms)
}

/// Build the router with an injected SMS sender. Tests use this to capture
/// issued codes.
pub fn build_app_with_sms(
    pool: PgPool,
    config: &Config,
    sms: Arc<dyn BaseSmsService>,
) -> Router {
    let jwt_service = Arc::new(JwtService::new(&config.jwt_secret, config.jwt_issuer.clone()));

    let auth: Arc<dyn AuthBackend> = match config.auth_backend {
        AuthBackendKind::Postgres => Arc::new(OtpAuthService::new(
            pool.clone(),
            sms,
            jwt_service.clone(),
        )),
        AuthBackendKind::Mock => Arc::new(MockAuthBackend::new(jwt_service.clone())),
    };

    let app_state = AppState {
        db_pool: pool,
        auth,
        jwt_service: jwt_service.clone(),
        started_at: Instant::now(),
    };

    // CORS: explicit origins when configured, permissive otherwise
    let cors = if config.allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods([Method::GET, Method::POST, Method::PUT])
            .allow_headers([AUTHORIZATION, CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT])
            .allow_headers([AUTHORIZATION, CONTENT_TYPE])
    };

    let mut router = Router::new()
        .route("/api/auth/send-otp", post(send_otp_handler))
        .route("/api/auth/verify-otp", post(verify_otp_handler))
        .route("/api/users/me", get(me_handler))
        .route("/api/users/profile", put(update_profile_handler))
        .route("/api/health", get(health_handler))
        .route("/api/diagnostics/database", get(database_diagnostics_handler));

    // Rate limiting stays off unless configured (see RATE_LIMIT_PER_SECOND)
    if let Some(rate_limit) = &config.rate_limit {
        let rate_limit_config = Arc::new(
            GovernorConfigBuilder::default()
                .per_second(rate_limit.per_second)
                .burst_size(rate_limit.burst)
                .use_headers() // Extract IP from X-Forwarded-For header
                .finish()
                .expect("Rate limiter configuration is valid and should never fail"),
        );
        router = router.layer(GovernorLayer {
            config: rate_limit_config,
        });
    }

    // Clone jwt_service for middleware closure
    let jwt_service_for_middleware = jwt_service.clone();

    // Middleware layers (applied in reverse order - last added runs first)
    router
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service_for_middleware.clone(), req, next)
        }))
        .layer(middleware::from_fn(extract_client_ip))
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
}
