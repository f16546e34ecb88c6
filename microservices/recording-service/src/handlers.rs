//! HTTP handlers for Recording Service API

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::recording::{RecordingStatusSnapshot, ToggleStats};
use crate::user_config::RecordingSettings;
use crate::{AppState, Error, Result};

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub soap_configured: bool,
}

/// Ready check response
#[derive(Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub soap_configured: bool,
}

/// User search criteria; at least one must be given
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub cn: Option<String>,
    pub h323: Option<String>,
    pub e164: Option<String>,
}

/// A user's configuration as returned by the lookup endpoint
#[derive(Debug, Serialize)]
pub struct UserConfigView {
    pub cn: Option<String>,
    pub groups: Vec<String>,
    pub recording: RecordingSettings,
    pub recording_enabled: bool,
    pub config_xml: String,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub supervisor: String,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub success: bool,
    pub message: String,
}

// ============================================
// Health & Metrics Handlers
// ============================================

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "recording-service".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        soap_configured: state.toggle.lookup().is_configured(),
    })
}

pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let configured = state.toggle.lookup().is_configured();
    let status = if configured {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadyResponse {
            ready: configured,
            soap_configured: configured,
        }),
    )
}

pub async fn stats(State(state): State<AppState>) -> Json<ToggleStats> {
    Json(state.toggle.metrics().snapshot())
}

// ============================================
// User Lookup Handlers
// ============================================

pub async fn find_user(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<UserConfigView>> {
    let cn = non_empty(query.cn.as_deref());
    let h323 = non_empty(query.h323.as_deref());
    let e164 = non_empty(query.e164.as_deref());

    if cn.is_none() && h323.is_none() && e164.is_none() {
        return Err(Error::InvalidRequest(
            "one of cn, h323 or e164 is required".to_string(),
        ));
    }

    let lookup = state.toggle.lookup();
    let config = lookup.find_user_config(cn, h323, e164).await?;
    let recording = config.recording();

    Ok(Json(UserConfigView {
        cn: config.common_name().map(str::to_string),
        groups: lookup.get_user_groups(&config)?,
        recording_enabled: recording.is_enabled(),
        recording,
        config_xml: config.to_xml()?,
    }))
}

// ============================================
// Recording Handlers
// ============================================

pub async fn recording_status(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<RecordingStatusSnapshot>> {
    let status = state.toggle.get_recording_status(&number).await?;
    Ok(Json(status))
}

pub async fn enable_recording(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Json(req): Json<ToggleRequest>,
) -> Result<(StatusCode, Json<ToggleResponse>)> {
    let supervisor = supervisor_of(&req)?;
    let accepted = state.toggle.enable_recording(&number, supervisor).await?;
    Ok(toggle_response(accepted, true))
}

pub async fn disable_recording(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Json(req): Json<ToggleRequest>,
) -> Result<(StatusCode, Json<ToggleResponse>)> {
    let supervisor = supervisor_of(&req)?;
    let accepted = state.toggle.disable_recording(&number, supervisor).await?;
    Ok(toggle_response(accepted, false))
}

fn supervisor_of(req: &ToggleRequest) -> Result<&str> {
    non_empty(Some(req.supervisor.as_str()))
        .ok_or_else(|| Error::InvalidRequest("supervisor is required".to_string()))
}

fn toggle_response(accepted: bool, enable: bool) -> (StatusCode, Json<ToggleResponse>) {
    let action = if enable { "enabled" } else { "disabled" };
    if accepted {
        (
            StatusCode::OK,
            Json(ToggleResponse {
                success: true,
                message: format!("Call recording {}.", action),
            }),
        )
    } else {
        (
            StatusCode::BAD_GATEWAY,
            Json(ToggleResponse {
                success: false,
                message: format!("An error occurred. Call recording could not be {}.", action),
            }),
        )
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::ConfigLookupService;
    use crate::recording::RecordingToggle;
    use crate::testing::MockAdminService;
    use pbx_core::PbxError;
    use pbx_soap_sdk::AdminService;
    use std::sync::Arc;

    const AGENT: &str = r#"<show><user cn="Agent"><grp name="CC-Sales"/></user></show>"#;
    const SUPERVISOR: &str = r#"<show><user cn="Boss"><grp name="CC-Sales"/></user></show>"#;

    fn state(mock: MockAdminService) -> (AppState, Arc<MockAdminService>) {
        let mock = Arc::new(mock);
        let lookup = ConfigLookupService::new(Some(mock.clone() as Arc<dyn AdminService>));
        let state = AppState {
            toggle: Arc::new(RecordingToggle::new(lookup, None)),
        };
        (state, mock)
    }

    fn pbx() -> MockAdminService {
        MockAdminService::new()
            .with_user("4711", "Agent", AGENT)
            .with_user("1001", "Boss", SUPERVISOR)
    }

    #[tokio::test]
    async fn test_find_user_requires_criteria() {
        let (state, _) = state(pbx());
        let query = UserQuery {
            cn: Some(" ".to_string()),
            h323: None,
            e164: None,
        };

        let err = find_user(State(state), Query(query)).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_find_user_by_number() {
        let (state, _) = state(pbx());
        let query = UserQuery {
            cn: None,
            h323: None,
            e164: Some("4711".to_string()),
        };

        let Json(view) = find_user(State(state), Query(query)).await.unwrap();
        assert_eq!(view.cn.as_deref(), Some("Agent"));
        assert_eq!(view.groups, vec!["CC-Sales"]);
        assert!(!view.recording_enabled);
        assert!(view.config_xml.starts_with("<user cn=\"Agent\">"));
    }

    #[tokio::test]
    async fn test_enable_counts_accepted_toggle() {
        let (state, mock) = state(pbx());
        let req = ToggleRequest {
            supervisor: "1001".to_string(),
        };

        let (status, Json(body)) =
            enable_recording(State(state.clone()), Path("4711".to_string()), Json(req))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!(body.success);
        assert_eq!(mock.submitted().len(), 1);

        let Json(stats) = stats(State(state)).await;
        assert_eq!(stats.accepted, 1);
    }

    #[tokio::test]
    async fn test_disable_rejected_by_pbx() {
        let (state, _) = state(pbx().with_modify_response("<error/>"));
        let req = ToggleRequest {
            supervisor: "1001".to_string(),
        };

        let (status, Json(body)) =
            disable_recording(State(state), Path("4711".to_string()), Json(req))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(!body.success);
    }

    #[tokio::test]
    async fn test_toggle_requires_supervisor() {
        let (state, mock) = state(pbx());
        let req = ToggleRequest {
            supervisor: String::new(),
        };

        let err = enable_recording(State(state), Path("4711".to_string()), Json(req))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        assert!(mock.shown().is_empty());
    }

    #[tokio::test]
    async fn test_status_of_unknown_number() {
        let (state, _) = state(pbx());

        let err = recording_status(State(state), Path("0000".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Pbx(PbxError::Upstream(_))));
    }

    #[test]
    fn test_toggle_response() {
        let (status, Json(body)) = toggle_response(true, true);
        assert_eq!(status, StatusCode::OK);
        assert!(body.success);
        assert_eq!(body.message, "Call recording enabled.");

        let (status, Json(body)) = toggle_response(false, false);
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(!body.success);
        assert!(body.message.contains("could not be disabled"));
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some(" 4711 ")), Some("4711"));
        assert_eq!(non_empty(Some("  ")), None);
        assert_eq!(non_empty(None), None);
    }
}
