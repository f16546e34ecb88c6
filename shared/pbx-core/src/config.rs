//! Configuration management for the PBX admin endpoint
//!
//! Settings are resolved in layers: built-in defaults, then the first
//! settings file found among the candidates, then `PBX__*` environment
//! overrides (e.g. `PBX__SOAP__URL`, `PBX__TLS__VERIFY_PEER`).

use crate::error::{PbxError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application-level settings file, checked first.
pub const APP_CONFIG_BASENAME: &str = "config/soap_config";
/// Namespaced fallback, used only when the application-level file is absent.
pub const NAMESPACED_CONFIG_BASENAME: &str = "config/pbx_manager/soap_config";

const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PbxConfig {
    pub soap: SoapConfig,
    pub proxy: ProxyConfig,
    pub tls: TlsConfig,
    pub recording: RecordingPolicyConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SoapConfig {
    /// SOAP endpoint (a trailing `?wsdl` is tolerated)
    pub url: Option<String>,
    pub login: Option<String>,
    pub password: Option<String>,
    /// Target namespace of the admin operations
    pub namespace: String,
    pub connect_timeout_secs: u64,
}

impl Default for SoapConfig {
    fn default() -> Self {
        Self {
            url: None,
            login: None,
            password: None,
            namespace: "http://tempuri.org/".to_string(),
            connect_timeout_secs: 10,
        }
    }
}

impl SoapConfig {
    /// Configured endpoint, if any. Blank values count as unset.
    pub fn endpoint(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// Outbound HTTP proxy
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub login: Option<String>,
    pub password: Option<String>,
}

impl ProxyConfig {
    /// Proxy URL when a host is configured
    pub fn url(&self) -> Option<String> {
        let host = self.host.as_deref().map(str::trim).filter(|h| !h.is_empty())?;
        Some(match self.port {
            Some(port) => format!("http://{}:{}", host, port),
            None => format!("http://{}", host),
        })
    }
}

/// TLS verification toggles.
///
/// Both default to `false`: the PBX admin endpoints this talks to commonly
/// present self-signed certificates. Turning verification on is a deployment
/// decision.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    pub verify_peer: bool,
    pub verify_peer_name: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecordingPolicyConfig {
    /// When set, only groups starting with this prefix count towards the
    /// supervisor/agent overlap check. Unset means every group counts.
    pub group_prefix: Option<String>,
}

impl PbxConfig {
    /// Resolve configuration from the default file locations and environment.
    pub fn load() -> Result<Self> {
        Self::load_from(&[
            PathBuf::from(APP_CONFIG_BASENAME),
            PathBuf::from(NAMESPACED_CONFIG_BASENAME),
        ])
    }

    /// Resolve configuration using the first existing file among `candidates`.
    ///
    /// Candidates are base names without extension; each is probed with the
    /// supported extensions in order.
    pub fn load_from(candidates: &[PathBuf]) -> Result<Self> {
        let mut builder = config::Config::builder();

        match candidates.iter().find_map(|base| find_config_file(base)) {
            Some(path) => {
                tracing::info!(path = %path.display(), "Loading PBX configuration file");
                builder = builder.add_source(config::File::from(path));
            }
            None => tracing::debug!("No PBX configuration file found, using defaults"),
        }

        builder = builder.add_source(
            // Values stay strings; credentials like `0123` must not be read as numbers
            config::Environment::with_prefix("PBX").separator("__"),
        );

        builder
            .build()
            .and_then(|settings| settings.try_deserialize::<PbxConfig>())
            .map_err(|e| PbxError::Config(e.to_string()))
    }
}

fn find_config_file(base: &Path) -> Option<PathBuf> {
    CONFIG_EXTENSIONS
        .iter()
        .map(|ext| base.with_extension(ext))
        .find(|path| path.is_file())
}
