use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use shared_config::AppConfig;

/// Six-digit numeric code, zero-padded.
pub fn generate_otp() -> String {
    let mut rng = rand::thread_rng();
    format!("{:06}", rng.gen_range(0..1_000_000))
}

pub fn otp_expiry(config: &AppConfig) -> DateTime<Utc> {
    Utc::now() + Duration::minutes(config.otp_ttl_minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_is_six_digits() {
        for _ in 0..100 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
