//! Call recording toggle
//!
//! A supervisor may switch recording on or off for an agent's phone when the
//! two share at least one PBX group. The agent's configuration is fetched,
//! its `phone/rec` element rewritten, and the result submitted as a
//! `<modify>` command. The PBX acknowledges with exactly `<ok/>`.

use pbx_core::{PbxError, Result};
use pbx_telemetry::{Counter, Histogram, HistogramSnapshot};
use serde::Serialize;
use std::collections::HashSet;
use std::time::Instant;

use crate::lookup::ConfigLookupService;
use crate::user_config::{self, RecordingSettings, ACK_PAYLOAD};

/// Recording state of one user as shown to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordingStatusSnapshot {
    /// Number the status was requested for
    pub user_number: String,
    /// Common name of the user
    pub username: Option<String>,
    /// Number recorded calls go to (the supervisor) when active
    pub number: Option<String>,
    pub recording: bool,
    pub settings: RecordingSettings,
}

/// Toggle outcome counters
#[derive(Clone)]
pub struct ToggleMetrics {
    accepted: Counter,
    rejected: Counter,
    denied: Counter,
    submit_latency_ms: Histogram,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToggleStats {
    pub accepted: u64,
    pub rejected: u64,
    pub denied: u64,
    pub submit_latency_ms: HistogramSnapshot,
}

impl ToggleMetrics {
    pub fn new() -> Self {
        Self {
            accepted: Counter::new(),
            rejected: Counter::new(),
            denied: Counter::new(),
            submit_latency_ms: Histogram::new(),
        }
    }

    pub fn snapshot(&self) -> ToggleStats {
        ToggleStats {
            accepted: self.accepted.get(),
            rejected: self.rejected.get(),
            denied: self.denied.get(),
            submit_latency_ms: self.submit_latency_ms.snapshot(),
        }
    }
}

impl Default for ToggleMetrics {
    fn default() -> Self {
        Self::new()
    }
}

pub struct RecordingToggle {
    lookup: ConfigLookupService,
    group_prefix: Option<String>,
    metrics: ToggleMetrics,
}

impl RecordingToggle {
    /// `group_prefix` narrows the groups considered for authorization;
    /// `None` lets any shared group authorize.
    pub fn new(lookup: ConfigLookupService, group_prefix: Option<String>) -> Self {
        Self {
            lookup,
            group_prefix,
            metrics: ToggleMetrics::new(),
        }
    }

    pub fn lookup(&self) -> &ConfigLookupService {
        &self.lookup
    }

    pub fn metrics(&self) -> &ToggleMetrics {
        &self.metrics
    }

    pub async fn get_recording_status(&self, number: &str) -> Result<RecordingStatusSnapshot> {
        self.lookup.ensure_configured()?;

        let config = self
            .lookup
            .find_user_config(None, None, Some(number))
            .await
            .map_err(PbxError::into_upstream)?;

        let settings = config.recording();
        Ok(RecordingStatusSnapshot {
            user_number: number.to_string(),
            username: config.common_name().map(str::to_string),
            number: settings.e164.clone(),
            recording: settings.is_enabled(),
            settings,
        })
    }

    pub async fn enable_recording(&self, agent: &str, supervisor: &str) -> Result<bool> {
        self.set_recording(agent, supervisor, true).await
    }

    pub async fn disable_recording(&self, agent: &str, supervisor: &str) -> Result<bool> {
        self.set_recording(agent, supervisor, false).await
    }

    /// Switch recording for `agent` on behalf of `supervisor`.
    ///
    /// `Err(Authorization)` when the two share no group, `Ok(false)` when the
    /// PBX answers anything but `<ok/>`, `Ok(true)` when it accepts.
    pub async fn set_recording(&self, agent: &str, supervisor: &str, enable: bool) -> Result<bool> {
        self.lookup.ensure_configured()?;

        let (mut agent_config, supervisor_config) = async {
            let agent_config = self.lookup.find_user_config(None, None, Some(agent)).await?;
            let supervisor_config = self
                .lookup
                .find_user_config(None, None, Some(supervisor))
                .await?;
            Ok::<_, PbxError>((agent_config, supervisor_config))
        }
        .await
        .map_err(PbxError::into_upstream)?;

        let agent_groups = self.lookup.get_user_groups(&agent_config)?;
        let supervisor_groups = self.lookup.get_user_groups(&supervisor_config)?;

        if !shares_group(&agent_groups, &supervisor_groups, self.group_prefix.as_deref()) {
            self.metrics.denied.inc();
            tracing::warn!(agent, supervisor, enable, "Recording change denied, no shared group");
            return Err(PbxError::Authorization(format!(
                "Supervisor {} is not permitted to change recording for agent {}",
                supervisor, agent
            )));
        }

        let command = user_config::set_recording_conf(&mut agent_config, enable, Some(supervisor))?;

        let started = Instant::now();
        let response = self.lookup.admin(&command).await?;
        self.metrics
            .submit_latency_ms
            .record(started.elapsed().as_secs_f64() * 1000.0);

        let accepted = response.trim() == ACK_PAYLOAD;
        if accepted {
            self.metrics.accepted.inc();
            tracing::info!(agent, supervisor, enable, "Recording configuration updated");
        } else {
            self.metrics.rejected.inc();
            tracing::warn!(
                agent,
                supervisor,
                enable,
                response = %response.trim(),
                "PBX rejected recording configuration"
            );
        }

        Ok(accepted)
    }
}

/// True when the agent has at least one group the supervisor also has.
///
/// With a prefix, only groups starting with it are compared on both sides.
fn shares_group(agent_groups: &[String], supervisor_groups: &[String], prefix: Option<&str>) -> bool {
    let relevant = |group: &&String| prefix.map_or(true, |p| group.starts_with(p));

    let supervisor: HashSet<&str> = supervisor_groups
        .iter()
        .filter(relevant)
        .map(String::as_str)
        .collect();

    agent_groups
        .iter()
        .filter(relevant)
        .any(|group| supervisor.contains(group.as_str()))
}
