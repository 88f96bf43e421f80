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
use shared_models::principal::{Admin, CurrentAdmin, ADMIN_STATUS_ACTIVE};
use shared_utils::jwt::{TokenError, TokenService};
use shared_utils::otp::{generate_otp, otp_expiry};
use shared_utils::password::{hash_password, verify_password};

use crate::models::{
    required, EmailOnlyRequest, LoginRequest, RefreshTokenRequest, RegisterRequest,
    ResetPasswordRequest, VerifyOtpRequest,
};
use crate::services::email::EmailService;

async fn find_admin_by_email(state: &AppState, email: &str) -> Result<Option<Admin>, AppError> {
    let mut docs = state
        .store
        .find(collections::ADMINS, &Query::new().eq("email", json!(email)))
        .await?;
    docs.pop()
        .map(|doc| {
            serde_json::from_value(doc)
                .map_err(|e| AppError::Internal(format!("Corrupt admin record: {}", e)))
        })
        .transpose()
}

async fn load_admin(state: &AppState, id: uuid::Uuid) -> Result<Option<Admin>, AppError> {
    state
        .store
        .get(collections::ADMINS, id)
        .await?
        .map(|doc| {
            serde_json::from_value(doc)
                .map_err(|e| AppError::Internal(format!("Corrupt admin record: {}", e)))
        })
        .transpose()
}

/// Unlike user registration there is no OTP gate: a freshly registered
/// admin is active and receives a token pair immediately.
pub async fn register_admin(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<ApiResponse, AppError> {
    let (name, email, password) = match (
        required(&request.name),
        required(&request.email),
        required(&request.password),
    ) {
        (Some(n), Some(e), Some(p)) => (n, e, p),
        _ => {
            return Err(AppError::Validation(
                "Name, email and password are required".to_string(),
            ))
        }
    };

    if find_admin_by_email(&state, email).await?.is_some() {
        return Err(AppError::Conflict(
            "Admin already exists with this email".to_string(),
        ));
    }

    let doc = state
        .store
        .insert(
            collections::ADMINS,
            json!({
                "name": name,
                "email": email,
                "password": hash_password(password)?,
                "role": "admin",
                "status": ADMIN_STATUS_ACTIVE,
                "otp": null,
                "otpExpiry": null,
            }),
        )
        .await?;
    let admin: Admin = serde_json::from_value(doc)
        .map_err(|e| AppError::Internal(format!("Corrupt admin record: {}", e)))?;

    let tokens = TokenService::new(&state.config).issue_pair(admin.id, Realm::Admin)?;
    info!("Registered admin {}", admin.id);

    Ok(ApiResponse::created(
        json!({
            "admin": CurrentAdmin::from(admin),
            "accessToken": tokens.access_token,
            "refreshToken": tokens.refresh_token,
        }),
        "Admin registered successfully",
    ))
}

pub async fn login_admin(
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

    let admin = find_admin_by_email(&state, email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;
    if !verify_password(password, &admin.password) {
        return Err(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    if !admin.is_active() {
        return Err(AppError::Forbidden("Admin account is inactive".to_string()));
    }

    let tokens = TokenService::new(&state.config).issue_pair(admin.id, Realm::Admin)?;
    info!("Admin {} logged in", admin.id);

    Ok(ApiResponse::ok(
        json!({
            "admin": CurrentAdmin::from(admin),
            "accessToken": tokens.access_token,
            "refreshToken": tokens.refresh_token,
        }),
        "Admin login successful",
    ))
}

pub async fn get_current_admin(
    Extension(admin): Extension<CurrentAdmin>,
) -> Result<ApiResponse, AppError> {
    Ok(ApiResponse::ok(
        json!({ "admin": admin }),
        "Admin retrieved successfully",
    ))
}

pub async fn logout_admin() -> Result<ApiResponse, AppError> {
    Ok(ApiResponse::ok(Value::Null, "Logout successful"))
}

pub async fn refresh_admin_token(
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
    if claims.realm != Realm::Admin {
        return Err(AppError::Unauthorized("Invalid refresh token".to_string()));
    }

    let admin = load_admin(&state, claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".to_string()))?;

    let tokens = service.issue_pair(admin.id, Realm::Admin)?;

    Ok(ApiResponse::ok(
        json!({
            "accessToken": tokens.access_token,
            "refreshToken": tokens.refresh_token,
        }),
        "Tokens refreshed successfully",
    ))
}

pub async fn forgot_admin_password(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EmailOnlyRequest>,
) -> Result<ApiResponse, AppError> {
    let email = required(&request.email)
        .ok_or_else(|| AppError::Validation("Email is required".to_string()))?;

    let admin = find_admin_by_email(&state, email)
        .await?
        .ok_or_else(|| AppError::NotFound("Admin not found".to_string()))?;

    let otp = issue_new_otp(&state, admin.id).await?;
    EmailService::new(&state.config)
        .send_otp_email(email, &otp)
        .await?;

    Ok(ApiResponse::ok(
        json!({ "email": email }),
        "OTP sent for password reset",
    ))
}

pub async fn resend_admin_otp(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EmailOnlyRequest>,
) -> Result<ApiResponse, AppError> {
    let email = required(&request.email)
        .ok_or_else(|| AppError::Validation("Email is required".to_string()))?;

    let admin = find_admin_by_email(&state, email)
        .await?
        .ok_or_else(|| AppError::NotFound("Admin not found".to_string()))?;

    let otp = issue_new_otp(&state, admin.id).await?;
    EmailService::new(&state.config)
        .send_otp_email(email, &otp)
        .await?;

    Ok(ApiResponse::ok(
        json!({ "email": email }),
        "OTP resent successfully",
    ))
}

async fn issue_new_otp(state: &AppState, admin_id: uuid::Uuid) -> Result<String, AppError> {
    let otp = generate_otp();
    state
        .store
        .update(
            collections::ADMINS,
            admin_id,
            json!({
                "otp": otp,
                "otpExpiry": serde_json::to_value(otp_expiry(&state.config))
                    .map_err(|e| AppError::Internal(e.to_string()))?,
            }),
        )
        .await?;
    Ok(otp)
}

pub async fn verify_admin_otp(
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

    let admin = find_admin_by_email(&state, email)
        .await?
        .ok_or_else(|| AppError::NotFound("Admin not found".to_string()))?;

    match admin.otp_expiry {
        Some(expiry) if expiry >= Utc::now() => {}
        _ => return Err(AppError::Validation("OTP has expired".to_string())),
    }
    if admin.otp.as_deref() != Some(otp) {
        return Err(AppError::Validation("Invalid OTP".to_string()));
    }

    state
        .store
        .update(
            collections::ADMINS,
            admin.id,
            json!({ "otp": null, "otpExpiry": null }),
        )
        .await?;

    Ok(ApiResponse::ok(
        json!({ "email": email }),
        "OTP verified successfully",
    ))
}

pub async fn reset_admin_password(
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

    let admin = find_admin_by_email(&state, email)
        .await?
        .ok_or_else(|| AppError::NotFound("Admin not found".to_string()))?;

    state
        .store
        .update(
            collections::ADMINS,
            admin.id,
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
