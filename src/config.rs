use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::env;

use crate::payments::providers::mpesa::MpesaConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub mpesa: MpesaConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let server = ServerConfig {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .map_err(|_| anyhow!("PORT must be a valid number"))?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        };

        let mpesa = MpesaConfig::from_env()?;

        let config = Config { server, mpesa };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Validate port range
        if self.server.port < 1024 {
            return Err(anyhow!(
                "Port must be at least 1024, got {}",
                self.server.port
            ));
        }

        // Validate environment
        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&self.server.environment.as_str()) {
            return Err(anyhow!(
                "Environment must be one of: {:?}, got {}",
                valid_environments,
                self.server.environment
            ));
        }

        if self.mpesa.base_url.trim().is_empty() {
            return Err(anyhow!("MPESA_BASE_URL cannot be empty"));
        }

        if self.mpesa.timeout_secs == 0 {
            return Err(anyhow!("MPESA_TIMEOUT_SECS must be greater than 0"));
        }

        // Daraja only delivers callbacks over HTTPS. Credentials are not
        // validated here; their absence is reported per dispatch so the
        // service can boot unconfigured.
        if !self.mpesa.callback_url.is_empty() && !self.mpesa.callback_url.starts_with("https://") {
            return Err(anyhow!(
                "MPESA_CALLBACK_URL must be an https URL, got {}",
                self.mpesa.callback_url
            ));
        }

        Ok(())
    }
}
