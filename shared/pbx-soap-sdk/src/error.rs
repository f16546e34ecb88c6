//! Error types for the SOAP SDK

use pbx_core::PbxError;

/// Result type alias
pub type Result<T> = std::result::Result<T, SoapError>;

/// SOAP client errors
#[derive(Debug, thiserror::Error)]
pub enum SoapError {
    #[error("Client configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("SOAP fault {code}: {message}")]
    Fault { code: String, message: String },

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Unexpected response: {0}")]
    Protocol(String),
}

impl From<reqwest::Error> for SoapError {
    fn from(err: reqwest::Error) -> Self {
        SoapError::Transport(err.to_string())
    }
}

impl From<SoapError> for PbxError {
    fn from(err: SoapError) -> Self {
        match err {
            SoapError::Config(msg) => PbxError::Config(msg),
            SoapError::Xml(msg) => PbxError::Xml(msg),
            other => PbxError::Upstream(other.to_string()),
        }
    }
}
