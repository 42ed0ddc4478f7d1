//! Server configuration

use mirror_common::{MirrorError, Result};
use serde::{Deserialize, Serialize};

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    /// Load server configuration from environment variables
    ///
    /// Environment variables:
    /// - `MIRROR_SERVER_HOST`: bind address (default `0.0.0.0`)
    /// - `MIRROR_SERVER_PORT`: bind port (default `8000`)
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("MIRROR_SERVER_HOST") {
            config.host = host;
        }

        if let Ok(port) = std::env::var("MIRROR_SERVER_PORT") {
            config.port = port
                .parse()
                .map_err(|_| MirrorError::config(format!("Invalid MIRROR_SERVER_PORT: {}", port)))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(MirrorError::config("MIRROR_SERVER_HOST cannot be empty"));
        }
        if self.port == 0 {
            return Err(MirrorError::config("MIRROR_SERVER_PORT must be greater than 0"));
        }
        Ok(())
    }

    /// The address to bind to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
