use axum::extract::{Json, State};
use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use serde_json::json;

use auth_cell::handlers::user;
use auth_cell::models::{
    EmailOnlyRequest, LoginRequest, RefreshTokenRequest, RegisterRequest, ResetPasswordRequest,
    VerifyOtpRequest,
};
use shared_database::store::collections;
use shared_database::{AppState, Query, Store};
use shared_models::auth::Realm;
use shared_models::error::AppError;
use shared_utils::jwt::TokenService;
use shared_utils::test_utils::{
    seed_unverified_user, seed_user, seed_user_with, test_state, TEST_PASSWORD,
};

fn register(name: &str, email: &str, password: &str) -> RegisterRequest {
    RegisterRequest {
        name: Some(name.to_string()),
        email: Some(email.to_string()),
        password: Some(password.to_string()),
        referral_id: None,
    }
}

fn login(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: Some(email.to_string()),
        password: Some(password.to_string()),
    }
}

async fn stored_otp(state: &AppState, email: &str) -> String {
    let docs = state
        .store
        .find(collections::USERS, &Query::new().eq("email", json!(email)))
        .await
        .unwrap();
    docs[0]["otp"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn register_verify_and_login_round_trip() {
    let state = test_state().await;

    let response = user::register_user(
        State(state.clone()),
        Json(register("Alice", "alice@test.local", "s3cret-pass")),
    )
    .await
    .unwrap();
    assert_eq!(response.status_code, 201);
    assert_eq!(
        response.message,
        "User registered successfully. OTP sent to email."
    );
    assert_eq!(response.data["email"], "alice@test.local");

    // Login before verification is refused.
    let err = user::login_user(
        State(state.clone()),
        Json(login("alice@test.local", "s3cret-pass")),
    )
    .await
    .unwrap_err();
    assert_matches!(err, AppError::Forbidden(msg) if msg == "Please verify your email first");

    let otp = stored_otp(&state, "alice@test.local").await;
    let response = user::verify_otp(
        State(state.clone()),
        Json(VerifyOtpRequest {
            email: Some("alice@test.local".to_string()),
            otp: Some(otp),
        }),
    )
    .await
    .unwrap();
    assert_eq!(response.message, "OTP verified successfully");
    assert_eq!(response.data["user"]["isVerified"], true);
    assert!(response.data["accessToken"].is_string());
    assert!(response.data["user"].get("password").is_none());

    let response = user::login_user(
        State(state),
        Json(login("alice@test.local", "s3cret-pass")),
    )
    .await
    .unwrap();
    assert_eq!(response.message, "Login successful");
    assert!(response.data["refreshToken"].is_string());
}

#[tokio::test]
async fn register_requires_all_fields() {
    let state = test_state().await;
    let err = user::register_user(
        State(state),
        Json(RegisterRequest {
            name: Some("Bob".to_string()),
            email: None,
            password: Some("x".to_string()),
            referral_id: None,
        }),
    )
    .await
    .unwrap_err();
    assert_matches!(err, AppError::Validation(msg) if msg == "All fields are required");
}

#[tokio::test]
async fn register_rejects_duplicate_emails() {
    let state = test_state().await;
    seed_user(&state, "carol@test.local").await;

    let err = user::register_user(
        State(state),
        Json(register("Carol", "carol@test.local", "pw-pw-pw")),
    )
    .await
    .unwrap_err();
    assert_matches!(err, AppError::Conflict(msg) if msg == "User already exists with this email");
}

#[tokio::test]
async fn verify_otp_rejects_wrong_and_stale_codes() {
    let state = test_state().await;
    let user_record = seed_unverified_user(&state, "dave@test.local", "123456").await;

    let err = user::verify_otp(
        State(state.clone()),
        Json(VerifyOtpRequest {
            email: Some("dave@test.local".to_string()),
            otp: Some("654321".to_string()),
        }),
    )
    .await
    .unwrap_err();
    assert_matches!(err, AppError::Validation(msg) if msg == "Invalid OTP");

    state
        .store
        .update(
            collections::USERS,
            user_record.id,
            json!({ "otpExpiry": Utc::now() - Duration::minutes(1) }),
        )
        .await
        .unwrap();
    let err = user::verify_otp(
        State(state),
        Json(VerifyOtpRequest {
            email: Some("dave@test.local".to_string()),
            otp: Some("123456".to_string()),
        }),
    )
    .await
    .unwrap_err();
    assert_matches!(err, AppError::Validation(msg) if msg == "OTP has expired");
}

#[tokio::test]
async fn login_does_not_reveal_which_credential_failed() {
    let state = test_state().await;
    seed_user(&state, "erin@test.local").await;

    let err = user::login_user(State(state.clone()), Json(login("ghost@test.local", "pw")))
        .await
        .unwrap_err();
    assert_matches!(err, AppError::Unauthorized(msg) if msg == "Invalid email or password");

    let err = user::login_user(State(state), Json(login("erin@test.local", "wrong")))
        .await
        .unwrap_err();
    assert_matches!(err, AppError::Unauthorized(msg) if msg == "Invalid email or password");
}

#[tokio::test]
async fn refresh_rotates_tokens_for_the_right_realm() {
    let state = test_state().await;
    let user_record = seed_user(&state, "frank@test.local").await;
    let service = TokenService::new(&state.config);

    let refresh = service
        .issue_refresh_token(user_record.id, Realm::User)
        .unwrap();
    let response = user::refresh_token(
        State(state.clone()),
        Json(RefreshTokenRequest {
            refresh_token: Some(refresh),
        }),
    )
    .await
    .unwrap();
    assert_eq!(response.message, "Tokens refreshed successfully");
    assert!(response.data["accessToken"].is_string());

    // An admin-realm refresh token is not accepted here.
    let foreign = service
        .issue_refresh_token(user_record.id, Realm::Admin)
        .unwrap();
    let err = user::refresh_token(
        State(state.clone()),
        Json(RefreshTokenRequest {
            refresh_token: Some(foreign),
        }),
    )
    .await
    .unwrap_err();
    assert_matches!(err, AppError::Unauthorized(msg) if msg == "Invalid refresh token");

    // Neither is an access token.
    let access = service
        .issue_access_token(user_record.id, Realm::User)
        .unwrap();
    let err = user::refresh_token(
        State(state),
        Json(RefreshTokenRequest {
            refresh_token: Some(access),
        }),
    )
    .await
    .unwrap_err();
    assert_matches!(err, AppError::Unauthorized(msg) if msg == "Invalid refresh token");
}

#[tokio::test]
async fn forgot_and_reset_password_flow() {
    let state = test_state().await;
    seed_user(&state, "gina@test.local").await;

    let response = user::forgot_password(
        State(state.clone()),
        Json(EmailOnlyRequest {
            email: Some("gina@test.local".to_string()),
        }),
    )
    .await
    .unwrap();
    assert_eq!(response.message, "OTP sent for password reset");

    let response = user::reset_password(
        State(state.clone()),
        Json(ResetPasswordRequest {
            email: Some("gina@test.local".to_string()),
            new_password: Some("brand-new-pass".to_string()),
        }),
    )
    .await
    .unwrap();
    assert_eq!(response.message, "Password reset successfully");

    let err = user::login_user(
        State(state.clone()),
        Json(login("gina@test.local", TEST_PASSWORD)),
    )
    .await
    .unwrap_err();
    assert_matches!(err, AppError::Unauthorized(_));

    let response = user::login_user(
        State(state),
        Json(login("gina@test.local", "brand-new-pass")),
    )
    .await
    .unwrap();
    assert_eq!(response.message, "Login successful");
}

#[tokio::test]
async fn resend_otp_requires_a_known_user() {
    let state = test_state().await;
    seed_user_with(&state, "hank@test.local", true, false).await;

    let response = user::resend_otp(
        State(state.clone()),
        Json(EmailOnlyRequest {
            email: Some("hank@test.local".to_string()),
        }),
    )
    .await
    .unwrap();
    assert_eq!(response.message, "OTP resent successfully");
    assert!(!stored_otp(&state, "hank@test.local").await.is_empty());

    let err = user::resend_otp(
        State(state),
        Json(EmailOnlyRequest {
            email: Some("ghost@test.local".to_string()),
        }),
    )
    .await
    .unwrap_err();
    assert_matches!(err, AppError::NotFound(msg) if msg == "User not found");
}
