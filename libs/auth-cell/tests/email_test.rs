use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_cell::services::email::EmailService;
use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_utils::test_utils::test_config;

fn mail_config(api_url: &str) -> AppConfig {
    AppConfig {
        mail_api_url: api_url.to_string(),
        mail_api_key: "mail-key".to_string(),
        ..test_config()
    }
}

#[tokio::test]
async fn sends_the_otp_through_the_provider() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .and(header("Authorization", "Bearer mail-key"))
        .and(body_partial_json(json!({
            "to": "alice@test.local",
            "subject": "Your Registration OTP",
            "text": "Your OTP is: 123456",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let config = mail_config(&format!("{}/send", server.uri()));
    EmailService::new(&config)
        .send_otp_email("alice@test.local", "123456")
        .await
        .unwrap();
}

#[tokio::test]
async fn provider_rejection_maps_to_external_service_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = mail_config(&server.uri());
    let err = EmailService::new(&config)
        .send_otp_email("bob@test.local", "123456")
        .await
        .unwrap_err();
    assert_matches!(err, AppError::ExternalService(msg) if msg == "Failed to send OTP email");
}

#[tokio::test]
async fn delivery_is_skipped_when_unconfigured() {
    // Empty URL means no provider; registration still succeeds.
    let config = test_config();
    EmailService::new(&config)
        .send_otp_email("carol@test.local", "123456")
        .await
        .unwrap();
}
