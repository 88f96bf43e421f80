use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which credential store a token belongs to. The two realms are fully
/// independent: a user-realm token never authenticates an admin route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Realm {
    User,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub realm: Realm,
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

/// Token pair returned by login, OTP verification and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}
