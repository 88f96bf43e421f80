use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use thiserror::Error;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{Claims, Realm, TokenKind, TokenPair};
use shared_models::error::AppError;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        AppError::Unauthorized(err.to_string())
    }
}

/// Issues and verifies HS256 tokens for both realms. Expiry is the only
/// invalidation mechanism; there is no revocation list.
pub struct TokenService {
    secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            access_ttl: Duration::minutes(config.access_token_ttl_minutes),
            refresh_ttl: Duration::days(config.refresh_token_ttl_days),
        }
    }

    pub fn issue_access_token(&self, principal_id: Uuid, realm: Realm) -> Result<String, AppError> {
        self.issue(principal_id, realm, TokenKind::Access, self.access_ttl)
    }

    pub fn issue_refresh_token(
        &self,
        principal_id: Uuid,
        realm: Realm,
    ) -> Result<String, AppError> {
        self.issue(principal_id, realm, TokenKind::Refresh, self.refresh_ttl)
    }

    pub fn issue_pair(&self, principal_id: Uuid, realm: Realm) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access_token: self.issue_access_token(principal_id, realm)?,
            refresh_token: self.issue_refresh_token(principal_id, realm)?,
        })
    }

    fn issue(
        &self,
        principal_id: Uuid,
        realm: Realm,
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: principal_id,
            realm,
            kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Decode and validate signature and expiry, and require the token to
    /// be of the expected kind so refresh tokens cannot authenticate
    /// requests and access tokens cannot be replayed for refresh.
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims, TokenError> {
        let validation = Validation::default();
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })?;

        if data.claims.kind != kind {
            return Err(TokenError::Invalid);
        }
        Ok(data.claims)
    }
}
