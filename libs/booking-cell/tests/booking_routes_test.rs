use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use booking_cell::router::booking_routes;
use shared_utils::test_utils::{
    admin_access_token, seed_admin, seed_doctor, seed_user, seed_user_with, test_state,
    user_access_token,
};

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_booking(token: Option<&str>, payload: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/")
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(payload.to_string())).unwrap()
}

#[tokio::test]
async fn create_requires_a_user_token() {
    let state = test_state().await;
    let app = booking_routes(state);

    let response = app
        .oneshot(post_booking(None, &json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Authorization token required");
}

#[tokio::test]
async fn deactivated_users_are_forbidden_despite_a_valid_token() {
    let state = test_state().await;
    let user = seed_user_with(&state, "ned@test.local", false, true).await;
    let token = user_access_token(&state, user.id);
    let app = booking_routes(state);

    let response = app
        .oneshot(post_booking(Some(&token), &json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Account is not active");
}

#[tokio::test]
async fn admin_listing_rejects_user_realm_tokens() {
    let state = test_state().await;
    let user = seed_user(&state, "peg@test.local").await;
    let token = user_access_token(&state, user.id);
    let app = booking_routes(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Invalid token");
}

#[tokio::test]
async fn create_and_update_through_the_routes() {
    let state = test_state().await;
    let user = seed_user(&state, "quinn@test.local").await;
    let admin = seed_admin(&state, "root@test.local").await;
    let doctor = seed_doctor(&state, "Dr Grey", true).await;
    let user_token = user_access_token(&state, user.id);
    let admin_token = admin_access_token(&state, admin.id);
    let app = booking_routes(state);

    let payload = json!({
        "bookingFor": "Doctor",
        "doctor": doctor.to_string(),
        "appointmentDate": Utc::now() + Duration::days(1),
        "reason": "Follow-up",
    });
    let response = app
        .clone()
        .oneshot(post_booking(Some(&user_token), &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["statusCode"], 201);
    assert_eq!(body["data"]["booking"]["status"], "Pending");
    let id = body["data"]["booking"]["id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/{}/status", id))
                .header("Content-Type", "application/json")
                .header("Authorization", format!("Bearer {}", admin_token))
                .body(Body::from(json!({ "status": "Confirmed" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Booking status updated successfully");
    assert_eq!(body["data"]["booking"]["status"], "Confirmed");
}

#[tokio::test]
async fn all_bookings_lists_for_admins_with_a_status_filter() {
    let state = test_state().await;
    let user = seed_user(&state, "rue@test.local").await;
    let admin = seed_admin(&state, "desk@test.local").await;
    let doctor = seed_doctor(&state, "Dr Bailey", true).await;
    let user_token = user_access_token(&state, user.id);
    let admin_token = admin_access_token(&state, admin.id);
    let app = booking_routes(state);

    let payload = json!({
        "bookingFor": "Doctor",
        "doctor": doctor.to_string(),
        "appointmentDate": Utc::now() + Duration::days(2),
    });
    let response = app
        .clone()
        .oneshot(post_booking(Some(&user_token), &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/all-bookings?status=Pending")
                .header("Authorization", format!("Bearer {}", admin_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Bookings retrieved successfully");
    assert_eq!(body["data"]["bookings"].as_array().unwrap().len(), 1);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/all-bookings?status=Cancelled")
                .header("Authorization", format!("Bearer {}", admin_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert!(body["data"]["bookings"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_path_id_renders_the_envelope() {
    let state = test_state().await;
    let admin = seed_admin(&state, "ops@test.local").await;
    let token = admin_access_token(&state, admin.id);
    let app = booking_routes(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/not-a-uuid")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Invalid ID format for id");
}
