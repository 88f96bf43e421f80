use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_days: i64,
    pub otp_ttl_minutes: i64,
    pub mail_api_url: String,
    pub mail_api_key: String,
    pub mail_from: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                warn!("JWT_SECRET not set, using empty value");
                String::new()
            }),
            access_token_ttl_minutes: parse_var("ACCESS_TOKEN_TTL_MINUTES", 15),
            refresh_token_ttl_days: parse_var("REFRESH_TOKEN_TTL_DAYS", 7),
            otp_ttl_minutes: parse_var("OTP_TTL_MINUTES", 10),
            mail_api_url: env::var("MAIL_API_URL").unwrap_or_else(|_| {
                warn!("MAIL_API_URL not set, using empty value");
                String::new()
            }),
            mail_api_key: env::var("MAIL_API_KEY").unwrap_or_else(|_| {
                warn!("MAIL_API_KEY not set, using empty value");
                String::new()
            }),
            mail_from: env::var("MAIL_FROM").unwrap_or_else(|_| {
                warn!("MAIL_FROM not set, using default");
                "no-reply@caremarket.local".to_string()
            }),
            port: parse_var("PORT", 3000u16),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.jwt_secret.is_empty()
    }

    pub fn is_mail_configured(&self) -> bool {
        !self.mail_api_url.is_empty() && !self.mail_api_key.is_empty()
    }
}

fn parse_var<T: std::str::FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} is not a valid number, using default {}", name, default);
            default
        }),
        Err(_) => default,
    }
}
