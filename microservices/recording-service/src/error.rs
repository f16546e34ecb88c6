//! Error types for the Recording Service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pbx_core::PbxError;
use serde_json::json;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Recording Service error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Pbx(#[from] PbxError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl Error {
    fn status(&self) -> StatusCode {
        match self {
            Error::Pbx(err) => StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Error::Pbx(err) => err.error_code(),
            Error::InvalidRequest(_) => "VALIDATION_ERROR",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Internal error: {:?}", self);
            "Internal server error".to_string()
        } else {
            if status.is_server_error() {
                tracing::error!(error = %self, "PBX request failed");
            }
            self.to_string()
        };

        let body = Json(json!({
            "error": message,
            "code": self.code(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::from(PbxError::Authorization("x".into())), StatusCode::FORBIDDEN),
            (Error::from(PbxError::ServiceUnavailable("x".into())), StatusCode::SERVICE_UNAVAILABLE),
            (Error::from(PbxError::Upstream("x".into())), StatusCode::BAD_GATEWAY),
            (Error::from(PbxError::UserNotFound("x".into())), StatusCode::NOT_FOUND),
            (Error::from(PbxError::Config("x".into())), StatusCode::INTERNAL_SERVER_ERROR),
            (Error::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_transparent_message() {
        let err = Error::from(PbxError::Authorization("Supervisor 1 on agent 2".into()));
        assert_eq!(err.to_string(), "Authorization error: Supervisor 1 on agent 2");
    }
}
