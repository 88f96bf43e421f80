use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use tracing::debug;
use uuid::Uuid;

use shared_database::store::collections;
use shared_database::{AppState, Store};
use shared_models::auth::{Realm, TokenKind};
use shared_models::error::AppError;
use shared_models::principal::{Admin, CurrentAdmin, CurrentUser, User};

use crate::jwt::TokenService;

pub fn bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    let auth_header = headers
        .get("Authorization")
        .ok_or_else(|| AppError::Unauthorized("Authorization token required".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Authorization token required".to_string()))?;

    if !auth_value.starts_with("Bearer ") {
        return Err(AppError::Unauthorized(
            "Authorization token required".to_string(),
        ));
    }

    Ok(auth_value[7..].to_string())
}

/// Path and body ids arrive as strings; a parse failure is the "malformed
/// identifier" case and reports the offending field.
pub fn parse_object_id(field: &str, raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidId(field.to_string()))
}

/// User-realm pipeline: bearer token, access-token verification, principal
/// load, activity gate, then the sanitized user goes into request
/// extensions for downstream handlers.
pub async fn authenticate_user(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?;

    let claims = TokenService::new(&state.config).verify(&token, TokenKind::Access)?;
    if claims.realm != Realm::User {
        return Err(AppError::Unauthorized("Invalid token".to_string()));
    }

    let doc = state
        .store
        .get(collections::USERS, claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;
    let user: User = serde_json::from_value(doc)
        .map_err(|e| AppError::Internal(format!("Corrupt user record: {}", e)))?;

    if !user.is_active {
        return Err(AppError::Forbidden("Account is not active".to_string()));
    }

    debug!("Authenticated user {}", user.id);
    request.extensions_mut().insert(CurrentUser::from(user));
    Ok(next.run(request).await)
}

/// Admin-realm pipeline, structurally identical to the user one but against
/// the admin collection and its `status` gate.
pub async fn authenticate_admin(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?;

    let claims = TokenService::new(&state.config).verify(&token, TokenKind::Access)?;
    if claims.realm != Realm::Admin {
        return Err(AppError::Unauthorized("Invalid token".to_string()));
    }

    let doc = state
        .store
        .get(collections::ADMINS, claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Admin not found".to_string()))?;
    let admin: Admin = serde_json::from_value(doc)
        .map_err(|e| AppError::Internal(format!("Corrupt admin record: {}", e)))?;

    if !admin.is_active() {
        return Err(AppError::Forbidden("Admin account is inactive".to_string()));
    }

    debug!("Authenticated admin {}", admin.id);
    request.extensions_mut().insert(CurrentAdmin::from(admin));
    Ok(next.run(request).await)
}

/// Role gate within the user realm, layered after `authenticate_user` on
/// routes that must distinguish privilege without switching realms.
pub async fn admin_only(request: Request<Body>, next: Next) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| AppError::Unauthorized("User not found in request extensions".to_string()))?;

    if user.role != "admin" {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }
    Ok(next.run(request).await)
}
