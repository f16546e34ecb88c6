//! Error types for PBX manager services

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PbxError>;

#[derive(Error, Debug)]
pub enum PbxError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// No remote admin client is configured (missing endpoint).
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The remote call failed or returned malformed data.
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("XML error: {0}")]
    Xml(String),
}

impl PbxError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Authorization(_) => 403,
            Self::UserNotFound(_) => 404,
            Self::Upstream(_) | Self::Xml(_) => 502,
            Self::ServiceUnavailable(_) => 503,
            Self::Config(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::ServiceUnavailable(_) => "UNAVAILABLE",
            Self::Upstream(_) => "UPSTREAM_ERROR",
            Self::Authorization(_) => "FORBIDDEN",
            Self::UserNotFound(_) => "NOT_FOUND",
            Self::Xml(_) => "XML_ERROR",
        }
    }

    /// Re-raise as a plain upstream failure, keeping only the original message.
    ///
    /// `ServiceUnavailable` passes through untouched so callers can still tell
    /// a missing client apart from a failing one.
    pub fn into_upstream(self) -> Self {
        match self {
            Self::Upstream(msg) => Self::Upstream(msg),
            Self::ServiceUnavailable(msg) => Self::ServiceUnavailable(msg),
            other => Self::Upstream(other.to_string()),
        }
    }
}
