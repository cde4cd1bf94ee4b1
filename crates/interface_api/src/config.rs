//! API configuration
//!
//! Every field can be set from an `API_`-prefixed environment variable
//! (`API_PORT`, `API_STORAGE_URL`, ...); unset fields keep their defaults.

use std::str::FromStr;

use serde::Deserialize;

use core_kernel::{Currency, Timezone};
use domain_booking::{CommitSettings, HandoffConfig, DOCUMENTS_BUCKET};
use domain_fleet::VEHICLE_PHOTOS_BUCKET;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for admin tokens
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// Database URL
    pub database_url: String,
    /// Run the embedded migrations at startup
    pub run_migrations: bool,
    /// Storage project URL
    pub storage_url: String,
    /// Storage service key
    pub storage_key: String,
    pub documents_bucket: String,
    pub photos_bucket: String,
    /// Agency WhatsApp number, international format without `+`
    pub handoff_phone: String,
    pub business_name: String,
    /// IANA name of the agency's timezone
    pub business_timezone: String,
    /// ISO code of the currency prices are quoted in
    pub currency: String,
    pub reject_overlapping_bookings: bool,
    /// Largest accepted request body, in bytes
    pub max_body_bytes: usize,
    /// Wizard sessions unused for this long are dropped
    pub session_idle_secs: u64,
    /// How often idle sessions are looked for
    pub session_sweep_secs: u64,
    /// Log level
    pub log_level: String,
    /// `pretty` or `json`
    pub log_format: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let handoff = HandoffConfig::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            database_url: "postgres://localhost/klk_rental".to_string(),
            run_migrations: true,
            storage_url: "http://localhost:54321".to_string(),
            storage_key: String::new(),
            documents_bucket: DOCUMENTS_BUCKET.to_string(),
            photos_bucket: VEHICLE_PHOTOS_BUCKET.to_string(),
            handoff_phone: handoff.phone,
            business_name: handoff.business_name,
            business_timezone: "Africa/Casablanca".to_string(),
            currency: "EUR".to_string(),
            reject_overlapping_bookings: false,
            // three 5 MB documents, base64-encoded, plus the JSON around them
            max_body_bytes: 24 * 1024 * 1024,
            session_idle_secs: 2 * 3600,
            session_sweep_secs: 60,
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn timezone(&self) -> Result<Timezone, config::ConfigError> {
        Timezone::from_str(&self.business_timezone)
            .map_err(|e| config::ConfigError::Message(e.to_string()))
    }

    pub fn currency(&self) -> Result<Currency, config::ConfigError> {
        Currency::from_str(&self.currency).map_err(|e| config::ConfigError::Message(e.to_string()))
    }

    /// Commit sequence settings derived from this configuration
    pub fn commit_settings(&self) -> Result<CommitSettings, config::ConfigError> {
        Ok(CommitSettings {
            reject_overlapping_bookings: self.reject_overlapping_bookings,
            currency: self.currency()?,
            handoff: HandoffConfig {
                phone: self.handoff_phone.trim_start_matches('+').to_string(),
                business_name: self.business_name.clone(),
            },
        })
    }

    pub fn session_idle(&self) -> chrono::Duration {
        const MAX_IDLE_SECS: u64 = 30 * 24 * 3600;
        chrono::Duration::seconds(self.session_idle_secs.min(MAX_IDLE_SECS) as i64)
    }

    pub fn session_sweep_period(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.session_sweep_secs.max(1))
    }

    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_agency() {
        let config = ApiConfig::default();
        assert_eq!(config.timezone().unwrap(), Timezone::casablanca());
        assert_eq!(config.currency().unwrap(), Currency::EUR);

        let settings = config.commit_settings().unwrap();
        assert_eq!(settings.handoff.phone, "212619700592");
        assert!(!settings.reject_overlapping_bookings);
        assert_eq!(config.session_idle(), chrono::Duration::hours(2));
    }

    #[test]
    fn test_zero_sweep_period_is_clamped() {
        let config = ApiConfig {
            session_sweep_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.session_sweep_period(), std::time::Duration::from_secs(1));
    }

    #[test]
    fn test_handoff_phone_plus_is_stripped() {
        let config = ApiConfig {
            handoff_phone: "+212600000000".to_string(),
            ..Default::default()
        };
        assert_eq!(config.commit_settings().unwrap().handoff.phone, "212600000000");
    }

    #[test]
    fn test_unknown_currency_is_a_config_error() {
        let config = ApiConfig {
            currency: "XYZ".to_string(),
            ..Default::default()
        };
        assert!(config.commit_settings().is_err());
    }
}
