// ── Engine state and its snapshot projections ──
//
// `InterfaceStats` / `TargetStats` are the poller's mutable working set;
// the `*Snapshot` types are deep value copies handed across the boundary.
// History is copied out of the ring with `all()`, so no reference to
// mutable poller state ever escapes.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::engine::rate::RateSample;
use crate::engine::ring::Ring;
use flowatch_snmp::OperStatus;

/// Live per-interface state, owned and mutated only by the poller.
pub(crate) struct InterfaceStats {
    /// 0 until resolved by an interface-table walk.
    pub if_index: u32,
    pub name: String,
    pub description: String,
    /// Mbps; 0 when unknown.
    pub speed_mbps: u64,
    pub status: OperStatus,
    pub in_bps: f64,
    pub out_bps: f64,
    pub utilization: f64,
    pub history: Ring<RateSample>,
    pub last_error: Option<String>,
    pub last_poll: Option<DateTime<Utc>>,
}

impl InterfaceStats {
    pub fn new(name: &str, history_depth: usize) -> Self {
        Self {
            if_index: 0,
            name: name.to_string(),
            description: String::new(),
            speed_mbps: 0,
            status: OperStatus::Unknown,
            in_bps: 0.0,
            out_bps: 0.0,
            utilization: 0.0,
            history: Ring::new(history_depth),
            last_error: None,
            last_poll: None,
        }
    }

    pub fn snapshot(&self) -> InterfaceSnapshot {
        InterfaceSnapshot {
            if_index: self.if_index,
            name: self.name.clone(),
            description: self.description.clone(),
            speed_mbps: self.speed_mbps,
            status: self.status,
            in_bps: self.in_bps,
            out_bps: self.out_bps,
            utilization: self.utilization,
            history: self.history.all(),
            last_error: self.last_error.clone(),
            last_poll: self.last_poll,
        }
    }
}

/// Live per-target state, owned by the poller.
pub(crate) struct TargetStats {
    pub host: String,
    pub label: String,
    pub interfaces: Vec<InterfaceStats>,
    pub last_error: Option<String>,
    pub last_poll: Option<DateTime<Utc>>,
}

impl TargetStats {
    pub fn snapshot(&self) -> TargetSnapshot {
        TargetSnapshot {
            host: self.host.clone(),
            label: self.label.clone(),
            interfaces: self.interfaces.iter().map(InterfaceStats::snapshot).collect(),
            last_error: self.last_error.clone(),
            last_poll: self.last_poll,
        }
    }
}

// ── Public value types ───────────────────────────────────────────────

/// Point-in-time copy of one interface's state.
#[derive(Debug, Clone)]
pub struct InterfaceSnapshot {
    pub if_index: u32,
    pub name: String,
    pub description: String,
    pub speed_mbps: u64,
    pub status: OperStatus,
    pub in_bps: f64,
    pub out_bps: f64,
    pub utilization: f64,
    pub history: Vec<RateSample>,
    pub last_error: Option<String>,
    pub last_poll: Option<DateTime<Utc>>,
}

/// Point-in-time copy of one target's state.
#[derive(Debug, Clone)]
pub struct TargetSnapshot {
    pub host: String,
    pub label: String,
    pub interfaces: Vec<InterfaceSnapshot>,
    pub last_error: Option<String>,
    pub last_poll: Option<DateTime<Utc>>,
}

impl TargetSnapshot {
    /// Display label, falling back to the host.
    pub fn display_name(&self) -> &str {
        if self.label.is_empty() {
            &self.host
        } else {
            &self.label
        }
    }
}

/// Point-in-time copy of a target group.
#[derive(Debug, Clone)]
pub struct GroupSnapshot {
    pub name: String,
    pub targets: Vec<TargetSnapshot>,
}

/// Point-in-time view of a whole session.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub name: String,
    pub groups: Vec<GroupSnapshot>,
    pub last_poll: Option<DateTime<Utc>>,
    pub poll_count: u64,
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    Stopped,
    Error,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => f.write_str("running"),
            Self::Stopped => f.write_str("stopped"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// Summary row for `SessionManager::list`.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub name: String,
    pub state: SessionState,
    pub last_poll: Option<DateTime<Utc>>,
    pub poll_count: u64,
    pub error_count: u64,
}

/// Delivered to subscribers once per poll cycle.
#[derive(Debug, Clone)]
pub struct Event {
    pub session: String,
    pub snapshot: Snapshot,
}
