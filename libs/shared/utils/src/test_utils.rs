//! Helpers shared by the cell test suites: a preconfigured in-memory
//! state, principal/catalog seeders and token minting.

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::store::collections;
use shared_database::{AppState, MemoryStore, Store};
use shared_models::auth::Realm;
use shared_models::principal::{Admin, User};

use crate::jwt::TokenService;
use crate::otp::otp_expiry;
use crate::password::hash_password;

pub fn test_config() -> AppConfig {
    AppConfig {
        jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
        access_token_ttl_minutes: 15,
        refresh_token_ttl_days: 7,
        otp_ttl_minutes: 10,
        mail_api_url: String::new(),
        mail_api_key: String::new(),
        mail_from: "no-reply@test.local".to_string(),
        port: 0,
    }
}

pub async fn test_state() -> Arc<AppState> {
    Arc::new(AppState::new(
        test_config(),
        MemoryStore::with_default_collections().await,
    ))
}

pub const TEST_PASSWORD: &str = "correct horse battery staple";

pub async fn seed_user(state: &AppState, email: &str) -> User {
    seed_user_with(state, email, true, true).await
}

pub async fn seed_user_with(
    state: &AppState,
    email: &str,
    is_active: bool,
    is_verified: bool,
) -> User {
    let doc = state
        .store
        .insert(
            collections::USERS,
            json!({
                "name": "Test User",
                "email": email,
                "password": hash_password(TEST_PASSWORD).unwrap(),
                "role": "user",
                "referralId": null,
                "isVerified": is_verified,
                "isActive": is_active,
                "otp": null,
                "otpExpiry": null,
            }),
        )
        .await
        .expect("seed user");
    serde_json::from_value(doc).expect("user roundtrip")
}

pub async fn seed_unverified_user(state: &AppState, email: &str, otp: &str) -> User {
    let doc = state
        .store
        .insert(
            collections::USERS,
            json!({
                "name": "Test User",
                "email": email,
                "password": hash_password(TEST_PASSWORD).unwrap(),
                "role": "user",
                "referralId": null,
                "isVerified": false,
                "isActive": true,
                "otp": otp,
                "otpExpiry": serde_json::to_value(otp_expiry(&state.config)).unwrap(),
            }),
        )
        .await
        .expect("seed user");
    serde_json::from_value(doc).expect("user roundtrip")
}

pub async fn seed_admin(state: &AppState, email: &str) -> Admin {
    seed_admin_with(state, email, "active").await
}

pub async fn seed_admin_with(state: &AppState, email: &str, status: &str) -> Admin {
    let doc = state
        .store
        .insert(
            collections::ADMINS,
            json!({
                "name": "Test Admin",
                "email": email,
                "password": hash_password(TEST_PASSWORD).unwrap(),
                "role": "admin",
                "status": status,
                "otp": null,
                "otpExpiry": null,
            }),
        )
        .await
        .expect("seed admin");
    serde_json::from_value(doc).expect("admin roundtrip")
}

pub async fn seed_doctor(state: &AppState, name: &str, is_active: bool) -> Uuid {
    let doc = state
        .store
        .insert(
            collections::DOCTORS,
            json!({
                "name": name,
                "qualification": "MBBS",
                "experience": 8,
                "specialties": ["Cardiology"],
                "services": ["Consultation"],
                "contactNumber": "5550100",
                "email": format!("{}@clinic.test", name.to_lowercase().replace(' ', ".")),
                "availableDays": ["Mon", "Wed"],
                "availableTime": "09:00-17:00",
                "location": "Test City",
                "isActive": is_active,
            }),
        )
        .await
        .expect("seed doctor");
    doc["id"].as_str().unwrap().parse().unwrap()
}

pub async fn seed_healthcare_center(state: &AppState, name: &str, is_active: bool) -> Uuid {
    let doc = state
        .store
        .insert(
            collections::HEALTHCARE_CENTERS,
            json!({
                "name": name,
                "address": "1 Test Street",
                "location": "Test City",
                "contactNumber": "5550200",
                "email": format!("{}@center.test", name.to_lowercase().replace(' ', ".")),
                "services": ["Diagnostics"],
                "specialties": ["Diagnostics"],
                "isActive": is_active,
            }),
        )
        .await
        .expect("seed healthcare center");
    doc["id"].as_str().unwrap().parse().unwrap()
}

pub fn user_access_token(state: &AppState, user_id: Uuid) -> String {
    TokenService::new(&state.config)
        .issue_access_token(user_id, Realm::User)
        .expect("issue token")
}

pub fn admin_access_token(state: &AppState, admin_id: Uuid) -> String {
    TokenService::new(&state.config)
        .issue_access_token(admin_id, Realm::Admin)
        .expect("issue token")
}
