//! Configuration for Recording Service

use anyhow::Context;
use pbx_core::PbxConfig;
use std::net::SocketAddr;

/// Recording Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP bind address
    pub host: String,
    /// HTTP port
    pub port: u16,
    /// PBX admin endpoint, proxy, TLS and authorization policy
    pub pbx: PbxConfig,
}

impl Config {
    /// Bind address from the environment, PBX settings from the layered
    /// configuration files plus `PBX__*` overrides
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8096".to_string())
                .parse()
                .context("Invalid PORT")?,
            pbx: PbxConfig::load()?,
        })
    }

    /// Get socket address for binding
    pub fn bind_address(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.host, self.port))
    }
}
