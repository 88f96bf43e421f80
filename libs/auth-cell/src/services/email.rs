use reqwest::Client;
use serde_json::json;
use tracing::{error, warn};

use shared_config::AppConfig;
use shared_models::error::AppError;

/// Fire-and-forget mail collaborator. Delivery goes through an HTTP mail
/// provider; the API never waits on anything beyond the provider accepting
/// the message.
pub struct EmailService {
    client: Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl EmailService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            api_url: config.mail_api_url.clone(),
            api_key: config.mail_api_key.clone(),
            from: config.mail_from.clone(),
        }
    }

    pub async fn send_otp_email(&self, to: &str, otp: &str) -> Result<(), AppError> {
        if self.api_url.is_empty() {
            warn!("Mail provider not configured, skipping OTP email to {}", to);
            return Ok(());
        }

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from,
                "to": to,
                "subject": "Your Registration OTP",
                "text": format!("Your OTP is: {}", otp),
            }))
            .send()
            .await
            .map_err(|e| {
                error!("Mail provider unreachable: {}", e);
                AppError::ExternalService("Failed to send OTP email".to_string())
            })?;

        if !response.status().is_success() {
            error!("Mail provider rejected message: {}", response.status());
            return Err(AppError::ExternalService(
                "Failed to send OTP email".to_string(),
            ));
        }
        Ok(())
    }
}
