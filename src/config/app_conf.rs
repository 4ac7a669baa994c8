use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

/// HTTP server configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Interface the server binds to
    pub host: String,
    /// Port the server listens on
    pub port: u16,
}

impl AppConfig {
    /// Load server configuration from environment variables
    ///
    /// Expected environment variables:
    /// - APP_HOST: Bind address (defaults to 127.0.0.1)
    /// - APP_PORT: Listen port (defaults to 8080)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading application configuration from environment variables");

        let host = env::var("APP_HOST").unwrap_or_else(|_| {
            warn!("APP_HOST not set, defaulting to 127.0.0.1");
            "127.0.0.1".to_string()
        });
        debug!("App host: {}", host);

        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| {
                warn!("APP_PORT not set, defaulting to 8080");
                "8080".to_string()
            })
            .parse::<u16>()
            .map_err(|_| {
                error!("Invalid APP_PORT value");
                ConfigError::InvalidValue("Invalid APP_PORT value".to_string())
            })?;
        debug!("App port: {}", port);

        let config = AppConfig { host, port };

        config.validate()?;
        info!("Application configuration loaded successfully");
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            error!("App host is empty");
            return Err(ConfigError::ValidationError(
                "App host cannot be empty".to_string(),
            ));
        }

        if self.port == 0 {
            error!("App port is 0");
            return Err(ConfigError::ValidationError(
                "App port must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}
