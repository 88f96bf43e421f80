use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use catalog_cell::router::catalog_routes;
use shared_utils::test_utils::{admin_access_token, seed_admin, seed_doctor, test_state};

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn reads_are_public() {
    let state = test_state().await;
    seed_doctor(&state, "Dr Grey", true).await;
    let app = catalog_routes(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/doctors/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Doctors retrieved successfully");
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn writes_require_an_admin_token() {
    let state = test_state().await;
    let app = catalog_routes(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/health-categories/")
                .header("Content-Type", "application/json")
                .body(Body::from(json!({ "name": "Cardiology" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Authorization token required");
}

#[tokio::test]
async fn admin_can_create_and_fetch_an_entity() {
    let state = test_state().await;
    let admin = seed_admin(&state, "ops@test.local").await;
    let token = admin_access_token(&state, admin.id);
    let app = catalog_routes(state);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/blogs/")
                .header("Content-Type", "application/json")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::from(
                    json!({ "title": "Flu season", "content": "Wash your hands." }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Blog created successfully");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/blogs/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["title"], "Flu season");
}
