use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_database::AppState;
use shared_utils::extractor::{authenticate_admin, authenticate_user};

use crate::handlers::{admin, user};

pub fn user_auth_routes(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/register", post(user::register_user))
        .route("/verify-otp", post(user::verify_otp))
        .route("/resend-otp", post(user::resend_otp))
        .route("/login", post(user::login_user))
        .route("/refresh-token", post(user::refresh_token))
        .route("/forgot-password", post(user::forgot_password))
        .route("/reset-password", post(user::reset_password));

    let protected = Router::new()
        .route("/me", get(user::get_current_user))
        .route("/logout", post(user::logout_user))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authenticate_user,
        ));

    Router::new().merge(public).merge(protected).with_state(state)
}

pub fn admin_auth_routes(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/register", post(admin::register_admin))
        .route("/login", post(admin::login_admin))
        .route("/refresh-token", post(admin::refresh_admin_token))
        .route("/forgot-password", post(admin::forgot_admin_password))
        .route("/verify-otp", post(admin::verify_admin_otp))
        .route("/resend-otp", post(admin::resend_admin_otp))
        .route("/reset-password", post(admin::reset_admin_password));

    let protected = Router::new()
        .route("/me", get(admin::get_current_admin))
        .route("/logout", post(admin::logout_admin))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authenticate_admin,
        ));

    Router::new().merge(public).merge(protected).with_state(state)
}
