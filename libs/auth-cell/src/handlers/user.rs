use std::sync::Arc;

use axum::extract::{Extension, Json, State};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use shared_database::store::collections;
use shared_database::{AppState, Query, Store};
use shared_models::auth::{Realm, TokenKind};
use shared_models::envelope::ApiResponse;
use shared_models::error::AppError;
use shared_models::principal::{CurrentUser, User};
use shared_utils::jwt::{TokenError, TokenService};
use shared_utils::otp::{generate_otp, otp_expiry};
use shared_utils::password::{hash_password, verify_password};

use crate::models::{
    required, EmailOnlyRequest, LoginRequest, RefreshTokenRequest, RegisterRequest,
    ResetPasswordRequest, VerifyOtpRequest,
};
use crate::services::email::EmailService;

pub(crate) async fn find_user_by_email(
    state: &AppState,
    email: &str,
) -> Result<Option<User>, AppError> {
    let mut docs = state
        .store
        .find(collections::USERS, &Query::new().eq("email", json!(email)))
        .await?;
    docs.pop()
        .map(|doc| {
            serde_json::from_value(doc)
                .map_err(|e| AppError::Internal(format!("Corrupt user record: {}", e)))
        })
        .transpose()
}

async fn load_user(state: &AppState, id: uuid::Uuid) -> Result<Option<User>, AppError> {
    state
        .store
        .get(collections::USERS, id)
        .await?
        .map(|doc| {
            serde_json::from_value(doc)
                .map_err(|e| AppError::Internal(format!("Corrupt user record: {}", e)))
        })
        .transpose()
}

pub async fn register_user(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<ApiResponse, AppError> {
    let (name, email, password) = match (
        required(&request.name),
        required(&request.email),
        required(&request.password),
    ) {
        (Some(n), Some(e), Some(p)) => (n, e, p),
        _ => return Err(AppError::Validation("All fields are required".to_string())),
    };

    if find_user_by_email(&state, email).await?.is_some() {
        return Err(AppError::Conflict(
            "User already exists with this email".to_string(),
        ));
    }

    let otp = generate_otp();
    let doc = state
        .store
        .insert(
            collections::USERS,
            json!({
                "name": name,
                "email": email,
                "password": hash_password(password)?,
                "role": "user",
                "referralId": request.referral_id,
                "isVerified": false,
                "isActive": true,
                "otp": otp,
                "otpExpiry": serde_json::to_value(otp_expiry(&state.config))
                    .map_err(|e| AppError::Internal(e.to_string()))?,
            }),
        )
        .await?;

    EmailService::new(&state.config)
        .send_otp_email(email, &otp)
        .await?;

    let user: User = serde_json::from_value(doc)
        .map_err(|e| AppError::Internal(format!("Corrupt user record: {}", e)))?;
    info!("Registered user {}", user.id);

    Ok(ApiResponse::created(
        json!({ "userId": user.id, "email": user.email }),
        "User registered successfully. OTP sent to email.",
    ))
}

pub async fn verify_otp(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VerifyOtpRequest>,
) -> Result<ApiResponse, AppError> {
    let (email, otp) = match (required(&request.email), required(&request.otp)) {
        (Some(e), Some(o)) => (e, o),
        _ => {
            return Err(AppError::Validation(
                "Email and OTP are required".to_string(),
            ))
        }
    };

    let user = find_user_by_email(&state, email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    // A user without a pending OTP is treated as expired, same as a stale one.
    match user.otp_expiry {
        Some(expiry) if expiry >= Utc::now() => {}
        _ => return Err(AppError::Validation("OTP has expired".to_string())),
    }
    if user.otp.as_deref() != Some(otp) {
        return Err(AppError::Validation("Invalid OTP".to_string()));
    }

    let doc = state
        .store
        .update(
            collections::USERS,
            user.id,
            json!({ "isVerified": true, "otp": null, "otpExpiry": null }),
        )
        .await?;
    let user: User = serde_json::from_value(doc)
        .map_err(|e| AppError::Internal(format!("Corrupt user record: {}", e)))?;

    let tokens = TokenService::new(&state.config).issue_pair(user.id, Realm::User)?;

    Ok(ApiResponse::ok(
        json!({
            "user": CurrentUser::from(user),
            "accessToken": tokens.access_token,
            "refreshToken": tokens.refresh_token,
        }),
        "OTP verified successfully",
    ))
}

pub async fn resend_otp(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EmailOnlyRequest>,
) -> Result<ApiResponse, AppError> {
    let email = required(&request.email)
        .ok_or_else(|| AppError::Validation("Email is required".to_string()))?;

    let user = find_user_by_email(&state, email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let otp = issue_new_otp(&state, user.id).await?;
    EmailService::new(&state.config)
        .send_otp_email(email, &otp)
        .await?;

    Ok(ApiResponse::ok(
        json!({ "email": email }),
        "OTP resent successfully",
    ))
}

async fn issue_new_otp(state: &AppState, user_id: uuid::Uuid) -> Result<String, AppError> {
    let otp = generate_otp();
    state
        .store
        .update(
            collections::USERS,
            user_id,
            json!({
                "otp": otp,
                "otpExpiry": serde_json::to_value(otp_expiry(&state.config))
                    .map_err(|e| AppError::Internal(e.to_string()))?,
            }),
        )
        .await?;
    Ok(otp)
}

pub async fn login_user(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<ApiResponse, AppError> {
    let (email, password) = match (required(&request.email), required(&request.password)) {
        (Some(e), Some(p)) => (e, p),
        _ => {
            return Err(AppError::Validation(
                "Email and password are required".to_string(),
            ))
        }
    };

    // Unknown email and wrong password are indistinguishable to the caller.
    let user = find_user_by_email(&state, email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;
    if !verify_password(password, &user.password) {
        return Err(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    if !user.is_verified {
        return Err(AppError::Forbidden(
            "Please verify your email first".to_string(),
        ));
    }

    let tokens = TokenService::new(&state.config).issue_pair(user.id, Realm::User)?;
    info!("User {} logged in", user.id);

    Ok(ApiResponse::ok(
        json!({
            "user": CurrentUser::from(user),
            "accessToken": tokens.access_token,
            "refreshToken": tokens.refresh_token,
        }),
        "Login successful",
    ))
}

pub async fn get_current_user(
    Extension(user): Extension<CurrentUser>,
) -> Result<ApiResponse, AppError> {
    Ok(ApiResponse::ok(
        json!({ "user": user }),
        "User retrieved successfully",
    ))
}

/// Sessions are stateless; there is nothing to invalidate server-side.
pub async fn logout_user() -> Result<ApiResponse, AppError> {
    Ok(ApiResponse::ok(Value::Null, "Logout successful"))
}

pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<ApiResponse, AppError> {
    let token = required(&request.refresh_token)
        .ok_or_else(|| AppError::Unauthorized("Refresh token required".to_string()))?;

    let service = TokenService::new(&state.config);
    let claims = service
        .verify(token, TokenKind::Refresh)
        .map_err(|e| match e {
            TokenError::Expired => AppError::Unauthorized("Refresh token expired".to_string()),
            TokenError::Invalid => AppError::Unauthorized("Invalid refresh token".to_string()),
        })?;
    if claims.realm != Realm::User {
        return Err(AppError::Unauthorized("Invalid refresh token".to_string()));
    }

    let user = load_user(&state, claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".to_string()))?;

    let tokens = service.issue_pair(user.id, Realm::User)?;

    Ok(ApiResponse::ok(
        json!({
            "accessToken": tokens.access_token,
            "refreshToken": tokens.refresh_token,
        }),
        "Tokens refreshed successfully",
    ))
}

pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EmailOnlyRequest>,
) -> Result<ApiResponse, AppError> {
    let email = required(&request.email)
        .ok_or_else(|| AppError::Validation("Email is required".to_string()))?;

    let user = find_user_by_email(&state, email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let otp = issue_new_otp(&state, user.id).await?;
    EmailService::new(&state.config)
        .send_otp_email(email, &otp)
        .await?;

    Ok(ApiResponse::ok(
        json!({ "email": email }),
        "OTP sent for password reset",
    ))
}

pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<ApiResponse, AppError> {
    let (email, new_password) = match (required(&request.email), required(&request.new_password)) {
        (Some(e), Some(p)) => (e, p),
        _ => {
            return Err(AppError::Validation(
                "Email and new password are required".to_string(),
            ))
        }
    };

    let user = find_user_by_email(&state, email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    state
        .store
        .update(
            collections::USERS,
            user.id,
            json!({
                "password": hash_password(new_password)?,
                "otp": null,
                "otpExpiry": null,
            }),
        )
        .await?;

    Ok(ApiResponse::ok(
        json!({ "email": email }),
        "Password reset successfully",
    ))
}
