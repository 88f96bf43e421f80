use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::{middleware, routing::get, Router};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use shared_database::store::collections;
use shared_database::{AppState, Store};
use shared_models::auth::Realm;
use shared_utils::extractor::{admin_only, authenticate_admin, authenticate_user};
use shared_utils::jwt::TokenService;
use shared_utils::password::hash_password;
use shared_utils::test_utils::{
    admin_access_token, seed_admin_with, seed_user, seed_user_with, test_state, user_access_token,
    TEST_PASSWORD,
};

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn user_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "ok" }))
        .layer(middleware::from_fn_with_state(state, authenticate_user))
}

fn admin_realm_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "ok" }))
        .layer(middleware::from_fn_with_state(state, authenticate_admin))
}

/// User-realm route that additionally requires the `admin` role.
fn role_gated_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "ok" }))
        .layer(middleware::from_fn(admin_only))
        .layer(middleware::from_fn_with_state(state, authenticate_user))
}

fn get_with_token(token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn missing_and_malformed_headers_are_unauthorized() {
    let state = test_state().await;

    let response = user_app(state.clone())
        .oneshot(get_with_token(None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await["message"],
        "Authorization token required"
    );

    let response = user_app(state)
        .oneshot(
            Request::builder()
                .uri("/")
                .header("Authorization", "Basic abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_tokens_are_reported_distinctly() {
    let state = test_state().await;
    let user = seed_user(&state, "tess@test.local").await;

    let mut stale_config = state.config.clone();
    stale_config.access_token_ttl_minutes = -5;
    let token = TokenService::new(&stale_config)
        .issue_access_token(user.id, Realm::User)
        .unwrap();

    let response = user_app(state)
        .oneshot(get_with_token(Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message"], "Token expired");
}

#[tokio::test]
async fn deleted_principals_no_longer_authenticate() {
    let state = test_state().await;
    let token = user_access_token(&state, Uuid::new_v4());

    let response = user_app(state)
        .oneshot(get_with_token(Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message"], "User no longer exists");
}

#[tokio::test]
async fn inactive_principals_are_forbidden() {
    let state = test_state().await;

    let user = seed_user_with(&state, "uma@test.local", false, true).await;
    let token = user_access_token(&state, user.id);
    let response = user_app(state.clone())
        .oneshot(get_with_token(Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["message"], "Account is not active");

    let admin = seed_admin_with(&state, "off@test.local", "suspended").await;
    let token = admin_access_token(&state, admin.id);
    let response = admin_realm_app(state)
        .oneshot(get_with_token(Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_json(response).await["message"],
        "Admin account is inactive"
    );
}

#[tokio::test]
async fn realms_do_not_cross() {
    let state = test_state().await;
    let user = seed_user(&state, "vic@test.local").await;
    let token = user_access_token(&state, user.id);

    let response = admin_realm_app(state)
        .oneshot(get_with_token(Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message"], "Invalid token");
}

#[tokio::test]
async fn role_gate_requires_the_admin_role() {
    let state = test_state().await;

    let user = seed_user(&state, "wes@test.local").await;
    let token = user_access_token(&state, user.id);
    let response = role_gated_app(state.clone())
        .oneshot(get_with_token(Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["message"], "Admin access required");

    // A user-realm principal whose role is "admin" passes.
    let doc = state
        .store
        .insert(
            collections::USERS,
            json!({
                "name": "Site Admin",
                "email": "site-admin@test.local",
                "password": hash_password(TEST_PASSWORD).unwrap(),
                "role": "admin",
                "isVerified": true,
                "isActive": true,
            }),
        )
        .await
        .unwrap();
    let id: Uuid = doc["id"].as_str().unwrap().parse().unwrap();
    let token = user_access_token(&state, id);

    let response = role_gated_app(state)
        .oneshot(get_with_token(Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
