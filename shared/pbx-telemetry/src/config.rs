//! Log output settings

/// Output encoding of the fmt layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Plain,
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub service_name: String,
    /// `EnvFilter` directives, e.g. `info,pbx_soap_sdk=debug`
    pub filter: String,
    pub format: LogFormat,
}

impl TelemetryConfig {
    pub fn from_env(service_name: &str) -> Self {
        Self::from_vars(service_name, |key| std::env::var(key).ok())
    }

    /// `SERVICE_NAME` overrides the name, `RUST_LOG` the filter; `JSON_LOGS`
    /// set to anything but `true`/`1` selects plain output.
    pub fn from_vars(service_name: &str, var: impl Fn(&str) -> Option<String>) -> Self {
        let format = match var("JSON_LOGS").as_deref() {
            None | Some("true") | Some("1") => LogFormat::Json,
            Some(_) => LogFormat::Plain,
        };

        Self {
            service_name: var("SERVICE_NAME").unwrap_or_else(|| service_name.to_string()),
            filter: var("RUST_LOG")
                .filter(|f| !f.trim().is_empty())
                .unwrap_or_else(|| "info".to_string()),
            format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from(pairs: &[(&str, &str)]) -> TelemetryConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        TelemetryConfig::from_vars("recording-service", |key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = from(&[]);
        assert_eq!(config.service_name, "recording-service");
        assert_eq!(config.filter, "info");
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn test_overrides() {
        let config = from(&[
            ("SERVICE_NAME", "pbx-a"),
            ("RUST_LOG", "debug,hyper=warn"),
            ("JSON_LOGS", "false"),
        ]);
        assert_eq!(config.service_name, "pbx-a");
        assert_eq!(config.filter, "debug,hyper=warn");
        assert_eq!(config.format, LogFormat::Plain);

        assert_eq!(from(&[("JSON_LOGS", "1")]).format, LogFormat::Json);
        assert_eq!(from(&[("RUST_LOG", " ")]).filter, "info");
    }
}
