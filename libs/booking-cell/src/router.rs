use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_database::AppState;
use shared_utils::extractor::{authenticate_admin, authenticate_user};

use crate::handlers;

/// Creation is open to authenticated users; everything else is the
/// admin back office. Auth is layered per method so `POST /` and
/// `GET /` can carry different realms.
pub fn booking_routes(state: Arc<AppState>) -> Router {
    let user_auth = middleware::from_fn_with_state(state.clone(), authenticate_user);
    let admin_auth = middleware::from_fn_with_state(state.clone(), authenticate_admin);

    Router::new()
        .route(
            "/",
            post(handlers::create_booking)
                .layer(user_auth)
                .merge(get(handlers::list_bookings).layer(admin_auth.clone())),
        )
        .route(
            "/all-bookings",
            get(handlers::all_bookings).layer(admin_auth.clone()),
        )
        .route(
            "/stats/overview",
            get(handlers::booking_stats).layer(admin_auth.clone()),
        )
        .route(
            "/doctor/{doctorId}",
            get(handlers::doctor_appointments).layer(admin_auth.clone()),
        )
        .route(
            "/healthcare/{healthcareId}",
            get(handlers::healthcare_appointments).layer(admin_auth.clone()),
        )
        .route(
            "/{id}",
            get(handlers::get_booking).layer(admin_auth.clone()),
        )
        .route(
            "/{id}/status",
            put(handlers::update_booking_status).layer(admin_auth.clone()),
        )
        .route(
            "/{id}/cancel",
            put(handlers::cancel_booking).layer(admin_auth),
        )
        .with_state(state)
}
