use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use auth_cell::router::{admin_auth_routes, user_auth_routes};
use booking_cell::router::booking_routes;
use catalog_cell::router::catalog_routes;
use shared_database::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "CareMarket API is running!" }))
        .nest("/api/v1/users", user_auth_routes(state.clone()))
        .nest("/api/v1/admin", admin_auth_routes(state.clone()))
        .nest("/api/v1/bookings", booking_routes(state.clone()))
        .merge(catalog_api(state))
}

fn catalog_api(state: Arc<AppState>) -> Router {
    Router::new().nest("/api/v1", catalog_routes(state))
}
