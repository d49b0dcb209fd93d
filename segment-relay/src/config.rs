//! Configuration module for environment variable parsing.
//!
//! A `.env` file in the working directory is loaded first when present, then
//! all settings are read from the process environment.

use std::env;

use thiserror::Error;
use tracing::warn;

use crate::web::signature::SignatureAlgorithm;

/// Errors that prevent the relay from starting.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {message}")]
    Invalid { name: &'static str, message: String },
}

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Shared secret used to verify `x-signature`
    pub shared_secret: String,

    /// Hash primitive of the webhook signer
    pub signature_algorithm: SignatureAlgorithm,

    /// Environment name reported in the `environment` tag
    pub environment: String,

    /// Path of the YAML event allow-list
    pub events_config_path: String,

    /// StatsD collector address
    pub statsd_addr: String,

    /// Port for the web server to listen on
    pub port: u16,
}

impl Config {
    /// Load configuration from `.env` and environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                warn!(error = %e, "dotenv_load_failed");
            }
        }

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let shared_secret = lookup("SEGMENT_SHARED_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("SEGMENT_SHARED_SECRET"))?;

        let signature_algorithm = match lookup("SEGMENT_SIGNATURE_ALGORITHM") {
            Some(raw) => raw.parse::<SignatureAlgorithm>().map_err(|message| ConfigError::Invalid {
                name: "SEGMENT_SIGNATURE_ALGORITHM",
                message,
            })?,
            None => SignatureAlgorithm::default(),
        };

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                message: format!("'{}' is not a port number", raw),
            })?,
            None => 8080,
        };

        Ok(Config {
            shared_secret,
            signature_algorithm,
            environment: lookup("APP_ENV").unwrap_or_else(|| "development".to_string()),
            events_config_path: lookup("EVENTS_CONFIG_PATH")
                .unwrap_or_else(|| "config.yml".to_string()),
            statsd_addr: lookup("STATSD_ADDR").unwrap_or_else(|| "127.0.0.1:8125".to_string()),
            port,
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("shared_secret", &"<redacted>")
            .field("signature_algorithm", &self.signature_algorithm)
            .field("environment", &self.environment)
            .field("events_config_path", &self.events_config_path)
            .field("statsd_addr", &self.statsd_addr)
            .field("port", &self.port)
            .finish()
    }
}
