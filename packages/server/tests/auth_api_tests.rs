//! HTTP-level integration tests for the auth surface.
//!
//! Spins up the full router on an ephemeral port and drives it with a real
//! HTTP client, with the capturing SMS mock injected for delivery.

mod common;

use std::sync::Arc;

use common::{fixtures, TestHarness};
use serde_json::{json, Value};
use server_core::config::{AppEnv, AuthBackendKind, Config};
use server_core::kernel::MockSmsService;
use server_core::server::build_app_with_sms;
use test_context::test_context;

fn test_config() -> Config {
    Config {
        database_url: String::new(), // unused: the pool is injected
        port: 0,
        app_env: AppEnv::Development,
        jwt_secret: "test_secret_key".to_string(),
        jwt_issuer: "test_issuer".to_string(),
        auth_backend: AuthBackendKind::Postgres,
        twilio: None,
        allowed_origins: Vec::new(),
        rate_limit: None,
    }
}

/// Serve the app on an ephemeral port; returns the base URL.
async fn spawn_app(ctx: &TestHarness, sms: MockSmsService) -> String {
    let app = build_app_with_sms(ctx.db_pool.clone(), &test_config(), Arc::new(sms));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
        )
        .await
        .unwrap();
    });

    format!("http://{}", addr)
}

// ============================================================================
// Validation
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn test_send_otp_rejects_malformed_numbers(ctx: &TestHarness) {
    let base = spawn_app(ctx, MockSmsService::new()).await;
    let client = reqwest::Client::new();

    for bad in ["12345", "98765abc10", ""] {
        let res = client
            .post(format!("{}/api/auth/send-otp", base))
            .json(&json!({ "mobile_number": bad }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 400, "{:?} should be a client fault", bad);

        let body: Value = res.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("mobile_number"));
    }
}

// ============================================================================
// Full flow
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn test_full_otp_flow_over_http(ctx: &TestHarness) {
    let sms = MockSmsService::new();
    let base = spawn_app(ctx, sms.clone()).await;
    let client = reqwest::Client::new();
    let mobile = fixtures::unique_mobile();

    // Request a code
    let res = client
        .post(format!("{}/api/auth/send-otp", base))
        .json(&json!({ "mobile_number": mobile }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "OTP sent successfully");

    let code = sms.last_code_for(&mobile).expect("code should be delivered");

    // Verify it
    let res = client
        .post(format!("{}/api/auth/verify-otp", base))
        .json(&json!({ "mobile_number": mobile, "otp": code }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();

    let token = body["token"].as_str().unwrap().to_string();
    assert!(!token.is_empty());
    assert_eq!(body["user"]["is_verified"], true);
    assert_eq!(body["user"]["mobile_number"], mobile.as_str());
    // The OTP columns never serialize into responses
    assert!(body["user"].get("otp").is_none());
    assert!(body["user"].get("otp_expires_at").is_none());

    // The token opens protected endpoints
    let res = client
        .get(format!("{}/api/users/me", base))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let me: Value = res.json().await.unwrap();
    assert_eq!(me["mobile_number"], mobile.as_str());

    // Without it, the endpoint is closed
    let res = client
        .get(format!("{}/api/users/me", base))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);

    // Profile updates flow through the same token
    let res = client
        .put(format!("{}/api/users/profile", base))
        .bearer_auth(&token)
        .json(&json!({ "name": "Asha", "city": "Pune" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["name"], "Asha");
    assert_eq!(updated["city"], "Pune");
    assert_eq!(updated["is_verified"], true);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_rejections_share_status_and_message(ctx: &TestHarness) {
    let sms = MockSmsService::new();
    let base = spawn_app(ctx, sms.clone()).await;
    let client = reqwest::Client::new();
    let mobile = fixtures::unique_mobile();
    let unknown = fixtures::unique_mobile();

    client
        .post(format!("{}/api/auth/send-otp", base))
        .json(&json!({ "mobile_number": mobile }))
        .send()
        .await
        .unwrap();
    let code = sms.last_code_for(&mobile).unwrap();
    let wrong_code = if code == "111111" { "222222" } else { "111111" };

    let res_wrong = client
        .post(format!("{}/api/auth/verify-otp", base))
        .json(&json!({ "mobile_number": mobile, "otp": wrong_code }))
        .send()
        .await
        .unwrap();
    let res_unknown = client
        .post(format!("{}/api/auth/verify-otp", base))
        .json(&json!({ "mobile_number": unknown, "otp": code }))
        .send()
        .await
        .unwrap();

    assert_eq!(res_wrong.status(), 400);
    assert_eq!(res_unknown.status(), 400);

    let body_wrong: Value = res_wrong.json().await.unwrap();
    let body_unknown: Value = res_unknown.json().await.unwrap();
    assert_eq!(body_wrong["error"], body_unknown["error"]);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_expired_code_rejected_over_http(ctx: &TestHarness) {
    let sms = MockSmsService::new();
    let base = spawn_app(ctx, sms.clone()).await;
    let client = reqwest::Client::new();
    let mobile = fixtures::unique_mobile();

    client
        .post(format!("{}/api/auth/send-otp", base))
        .json(&json!({ "mobile_number": mobile }))
        .send()
        .await
        .unwrap();
    let code = sms.last_code_for(&mobile).unwrap();

    fixtures::force_expire_otp(&ctx.db_pool, &mobile).await.unwrap();

    let res = client
        .post(format!("{}/api/auth/verify-otp", base))
        .json(&json!({ "mobile_number": mobile, "otp": code }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
}

// ============================================================================
// Operational endpoints
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn test_health_endpoint(ctx: &TestHarness) {
    let base = spawn_app(ctx, MockSmsService::new()).await;

    let res = reqwest::get(format!("{}/api/health", base)).await.unwrap();
    assert_eq!(res.status(), 200);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"]["status"], "ok");
    assert!(body["uptime_seconds"].is_u64());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_database_diagnostics_endpoint(ctx: &TestHarness) {
    let base = spawn_app(ctx, MockSmsService::new()).await;

    let res = reqwest::get(format!("{}/api/diagnostics/database", base))
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert!(body["connection_pool"]["size"].is_u64());
    assert!(body["applied_migrations"].as_i64().unwrap() >= 1);
}
