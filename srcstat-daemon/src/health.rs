//! Daemon health report.
//!
//! The daemon runs two long-lived modules, the UDP listener and the match
//! engine. Each reports its own [`HealthStatus`]; the daemon status is the
//! most severe of the two, and its reason lists every module at that severity.

use serde::Serialize;

use srcstat_core::pipeline::HealthStatus;

/// Name the listener reports under.
pub const MODULE_LISTENER: &str = "listener";

/// Name the match engine reports under.
pub const MODULE_MATCH_ENGINE: &str = "match-engine";

/// Health snapshot of the whole daemon.
#[derive(Debug, Clone, Serialize)]
pub struct DaemonHealth {
    pub status: HealthStatus,
    pub uptime_secs: u64,
    pub modules: Vec<ModuleHealth>,
}

impl DaemonHealth {
    /// Status of one module by name.
    pub fn module(&self, name: &str) -> Option<&HealthStatus> {
        self.modules
            .iter()
            .find(|m| m.name == name)
            .map(|m| &m.status)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleHealth {
    pub name: String,
    pub status: HealthStatus,
}

impl ModuleHealth {
    pub fn new(name: impl Into<String>, status: HealthStatus) -> Self {
        Self {
            name: name.into(),
            status,
        }
    }
}

fn severity(status: &HealthStatus) -> u8 {
    match status {
        HealthStatus::Healthy => 0,
        HealthStatus::Degraded(_) => 1,
        HealthStatus::Unhealthy(_) => 2,
    }
}

/// Fold module statuses into the daemon status.
///
/// Reasons are `name: reason` joined with `; `, taken only from modules at
/// the worst severity.
pub fn aggregate_status(modules: &[ModuleHealth]) -> HealthStatus {
    let worst = modules
        .iter()
        .map(|m| severity(&m.status))
        .max()
        .unwrap_or(0);

    let reasons = modules
        .iter()
        .filter(|m| worst > 0 && severity(&m.status) == worst)
        .filter_map(|m| match &m.status {
            HealthStatus::Healthy => None,
            HealthStatus::Degraded(r) | HealthStatus::Unhealthy(r) => {
                Some(format!("{}: {}", m.name, r))
            }
        })
        .collect::<Vec<_>>()
        .join("; ");

    match worst {
        0 => HealthStatus::Healthy,
        1 => HealthStatus::Degraded(reasons),
        _ => HealthStatus::Unhealthy(reasons),
    }
}
