use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Full user record as persisted. Password is the argon2 hash, never the
/// plaintext; `otp`/`otp_expiry` are transient and cleared after use.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default = "default_user_role")]
    pub role: String,
    #[serde(default)]
    pub referral_id: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub otp: Option<String>,
    #[serde(default)]
    pub otp_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_user_role() -> String {
    "user".to_string()
}

/// Full admin record as persisted. Admins gate on `status` ("active")
/// rather than the boolean flag users carry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default = "default_admin_role")]
    pub role: String,
    #[serde(default = "default_admin_status")]
    pub status: String,
    #[serde(default)]
    pub otp: Option<String>,
    #[serde(default)]
    pub otp_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_admin_role() -> String {
    "admin".to_string()
}

pub const ADMIN_STATUS_ACTIVE: &str = "active";

fn default_admin_status() -> String {
    ADMIN_STATUS_ACTIVE.to_string()
}

impl Admin {
    pub fn is_active(&self) -> bool {
        self.status == ADMIN_STATUS_ACTIVE
    }
}

/// User with credential and OTP fields stripped. This is what handlers see
/// in request extensions and what goes over the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub referral_id: Option<String>,
    pub is_verified: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            referral_id: user.referral_id,
            is_verified: user.is_verified,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentAdmin {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Admin> for CurrentAdmin {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id,
            name: admin.name,
            email: admin.email,
            role: admin.role,
            status: admin.status,
            created_at: admin.created_at,
            updated_at: admin.updated_at,
        }
    }
}
