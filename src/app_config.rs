use crate::api_server_axum::GatewayConfig;
use crate::config;
use anyhow::{bail, Result};

/// Application configuration handler
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mode: String,
    pub port: u16,
    pub gateway: GatewayConfig,
    /// Where `select` mode finds the gateway
    pub gateway_url: String,
    pub default_ticker: String,
}

impl AppConfig {
    /// Create new configuration from environment variables
    pub fn from_env() -> Self {
        let port = Self::get_port();
        Self {
            mode: config::get_execution_mode(),
            port,
            gateway: GatewayConfig::from_env(),
            gateway_url: std::env::var("OPTIONS_GATEWAY_URL")
                .unwrap_or_else(|_| format!("http://127.0.0.1:{}", port)),
            default_ticker: config::get_default_ticker(),
        }
    }

    /// Get port from environment or default
    fn get_port() -> u16 {
        std::env::var("OPTIONS_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(config::DEFAULT_PORT)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.mode.as_str(), "server" | "select") {
            bail!("Invalid mode '{}'. Use 'server' or 'select'", self.mode);
        }
        if !self.gateway.upstream_url.starts_with("http") {
            bail!("Upstream URL '{}' is not an http(s) URL", self.gateway.upstream_url);
        }
        Ok(())
    }
}
