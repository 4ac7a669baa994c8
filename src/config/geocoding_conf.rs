use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

/// Geocoding API configuration structure
///
/// When geocoding is disabled the submission flow uses the manually
/// entered latitude/longitude instead of calling the external API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Whether address resolution through the external API is enabled
    pub enabled: bool,
    /// Base URL of the geocoding endpoint
    pub api_url: String,
    /// API key sent with every request (required when enabled)
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl GeocodingConfig {
    /// Load geocoding configuration from environment variables
    ///
    /// Expected environment variables:
    /// - GEOCODING_ENABLED: "true" to resolve addresses via the API (defaults to false)
    /// - GEOCODING_API_URL: Geocoding endpoint (defaults to the Google Maps geocode API)
    /// - GEOCODING_API_KEY: API key (required when enabled)
    /// - GEOCODING_TIMEOUT: Request timeout in seconds (defaults to 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading geocoding configuration from environment variables");

        let enabled = env::var("GEOCODING_ENABLED")
            .unwrap_or_else(|_| {
                warn!("GEOCODING_ENABLED not set, defaulting to false (manual coordinates)");
                "false".to_string()
            })
            .parse()
            .unwrap_or(false);
        debug!("Geocoding enabled: {}", enabled);

        let api_url = env::var("GEOCODING_API_URL")
            .unwrap_or_else(|_| "https://maps.googleapis.com/maps/api/geocode/json".to_string());
        debug!("Geocoding API URL: {}", api_url);

        let api_key = match env::var("GEOCODING_API_KEY") {
            Ok(key) => key,
            Err(_) if enabled => {
                error!("GEOCODING_API_KEY environment variable not found but geocoding is enabled");
                return Err(ConfigError::EnvVarNotFound("GEOCODING_API_KEY".to_string()));
            }
            Err(_) => String::new(),
        };

        let timeout_secs = env::var("GEOCODING_TIMEOUT")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()
            .map_err(|_| {
                error!("Invalid GEOCODING_TIMEOUT value");
                ConfigError::InvalidValue("Invalid GEOCODING_TIMEOUT value".to_string())
            })?;

        let config = GeocodingConfig {
            enabled,
            api_url,
            api_key,
            timeout_secs,
        };

        config.validate()?;
        info!("Geocoding configuration loaded successfully");
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.api_key.is_empty() {
            error!("Geocoding is enabled but no API key is configured");
            return Err(ConfigError::ValidationError(
                "Geocoding API key cannot be empty when geocoding is enabled".to_string(),
            ));
        }

        if self.enabled && self.api_url.is_empty() {
            error!("Geocoding is enabled but the API URL is empty");
            return Err(ConfigError::ValidationError(
                "Geocoding API URL cannot be empty when geocoding is enabled".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            error!("Geocoding timeout is 0");
            return Err(ConfigError::ValidationError(
                "Geocoding timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        GeocodingConfig {
            enabled: false,
            api_url: "https://maps.googleapis.com/maps/api/geocode/json".to_string(),
            api_key: String::new(),
            timeout_secs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_disabled() {
        let config = GeocodingConfig::default();
        assert!(!config.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_enabled_without_key_is_invalid() {
        let mut config = GeocodingConfig::default();
        config.enabled = true;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_enabled_with_key_is_valid() {
        let mut config = GeocodingConfig::default();
        config.enabled = true;
        config.api_key = "test-key".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_is_invalid() {
        let mut config = GeocodingConfig::default();
        config.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
