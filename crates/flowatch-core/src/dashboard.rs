// ── Dashboard configuration model ──
//
// Describes *what* to monitor: groups of targets, each with a host, an
// identity name, and the interfaces to watch. Built by the TOML loader
// (or programmatically) and handed to the SessionManager — the core
// never reads config files itself.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Default SNMP port applied when a target leaves it unset.
pub const DEFAULT_SNMP_PORT: u16 = 161;

fn default_interval_secs() -> u64 {
    10
}

fn default_max_history() -> usize {
    360
}

/// A complete dashboard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub name: String,

    /// Identity inherited by targets that don't name their own.
    #[serde(default)]
    pub default_identity: String,

    /// Poll cadence in seconds (minimum 1).
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Per-interface history depth in samples.
    #[serde(default = "default_max_history")]
    pub max_history: usize,

    #[serde(default)]
    pub groups: Vec<Group>,
}

/// A named collection of monitoring targets. Purely organizational.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    #[serde(default)]
    pub targets: Vec<Target>,
}

/// A single SNMP device to monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub host: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub identity: String,
    /// 0 means "use the default port".
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub interfaces: Vec<String>,
}

impl Dashboard {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Fill in per-target defaults: port 161 and the dashboard's default
    /// identity for targets that don't carry their own.
    pub fn normalize(&mut self) {
        for group in &mut self.groups {
            for target in &mut group.targets {
                if target.port == 0 {
                    target.port = DEFAULT_SNMP_PORT;
                }
                if target.identity.is_empty() {
                    target.identity = self.default_identity.clone();
                }
            }
        }
    }

    /// Reject configurations the engine cannot run.
    pub fn validate(&self) -> Result<(), CoreError> {
        let invalid = |reason: &str| CoreError::InvalidDashboard {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("dashboard name must not be empty"));
        }
        if self.interval_secs < 1 {
            return Err(invalid("poll interval must be at least 1 second"));
        }
        if self.max_history < 1 {
            return Err(invalid("history depth must be at least 1 sample"));
        }
        for group in &self.groups {
            for target in &group.targets {
                if target.host.trim().is_empty() {
                    return Err(invalid("target host must not be empty"));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_toml() -> &'static str {
        r#"
            name = "edge"
            default_identity = "lab"

            [[groups]]
            name = "Core"

            [[groups.targets]]
            host = "10.0.0.1"
            label = "core-sw1"
            interfaces = ["GigabitEthernet0/0", "GigabitEthernet0/1"]

            [[groups]]
            name = "Branch"

            [[groups.targets]]
            host = "10.0.1.1"
            identity = "branch"
            port = 1161
            interfaces = ["eth0"]
        "#
    }

    #[test]
    fn defaults_applied_on_load() {
        let mut dash: Dashboard = toml::from_str(sample_toml()).unwrap();
        dash.normalize();

        assert_eq!(dash.interval_secs, 10);
        assert_eq!(dash.max_history, 360);

        let first = &dash.groups[0].targets[0];
        assert_eq!(first.port, DEFAULT_SNMP_PORT);
        assert_eq!(first.identity, "lab");

        let second = &dash.groups[1].targets[0];
        assert_eq!(second.port, 1161);
        assert_eq!(second.identity, "branch");
    }

    #[test]
    fn groups_are_fully_preserved() {
        let dash: Dashboard = toml::from_str(sample_toml()).unwrap();
        assert_eq!(dash.groups.len(), 2);
        assert_eq!(dash.groups[0].name, "Core");
        assert_eq!(dash.groups[1].name, "Branch");

        let rendered = toml::to_string(&dash).unwrap();
        let reloaded: Dashboard = toml::from_str(&rendered).unwrap();
        assert_eq!(reloaded.groups.len(), 2);
        assert_eq!(reloaded.groups[1].targets[0].host, "10.0.1.1");
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let mut dash: Dashboard = toml::from_str(sample_toml()).unwrap();
        dash.interval_secs = 0;
        assert!(matches!(
            dash.validate(),
            Err(CoreError::InvalidDashboard { .. })
        ));
    }

    #[test]
    fn validate_rejects_zero_history() {
        let mut dash: Dashboard = toml::from_str(sample_toml()).unwrap();
        dash.max_history = 0;
        assert!(dash.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_name() {
        let mut dash: Dashboard = toml::from_str(sample_toml()).unwrap();
        dash.name = "  ".into();
        assert!(dash.validate().is_err());
    }

    #[test]
    fn validate_accepts_sane_dashboard() {
        let mut dash: Dashboard = toml::from_str(sample_toml()).unwrap();
        dash.normalize();
        assert!(dash.validate().is_ok());
    }
}
