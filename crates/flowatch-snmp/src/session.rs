// ── Session traits and value types ──
//
// The seam between the polling engine and the wire library. A connector
// opens one session per target host; a session exposes exactly the
// operations the engine performs each cycle. The engine's tests supply an
// in-memory connector instead of the UDP-backed one.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::auth::SnmpAuth;
use crate::error::SnmpError;

/// Raw 64-bit octet totals for one interface, with the local timestamp
/// taken when the GET response completed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterSample {
    pub in_octets: u64,
    pub out_octets: u64,
    pub timestamp: DateTime<Utc>,
}

/// Operational status of an interface (IF-MIB::ifOperStatus).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperStatus {
    #[default]
    Unknown,
    Up,
    Down,
    Testing,
}

impl OperStatus {
    /// Map the raw ifOperStatus integer.
    pub fn from_raw(value: i64) -> Self {
        match value {
            1 => Self::Up,
            2 => Self::Down,
            3 => Self::Testing,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for OperStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown"),
            Self::Up => f.write_str("up"),
            Self::Down => f.write_str("down"),
            Self::Testing => f.write_str("testing"),
        }
    }
}

/// One row of the interface table, assembled from the column walks.
#[derive(Debug, Clone, Default)]
pub struct InterfaceInfo {
    pub if_index: u32,
    pub name: String,
    pub description: String,
    pub alias: String,
    pub speed_mbps: u64,
    pub status: OperStatus,
}

/// An open session to one SNMP agent.
pub trait SnmpSession: Send + Sync {
    /// GET ifHCInOctets and ifHCOutOctets for the interface; the sample
    /// timestamp is taken locally when the response completes.
    fn counters(&mut self, if_index: u32) -> Result<CounterSample, SnmpError>;

    /// GET ifOperStatus for the interface.
    fn oper_status(&mut self, if_index: u32) -> Result<OperStatus, SnmpError>;

    /// Bulk-walk the interface table columns (ifName, ifDescr, ifAlias,
    /// ifHighSpeed, ifOperStatus). When an entry has no ifName, its
    /// ifDescr is promoted to the name.
    fn walk_interfaces(&mut self) -> Result<BTreeMap<u32, InterfaceInfo>, SnmpError>;

    /// GET sysDescr.0. Used by connectivity tests.
    fn system_description(&mut self) -> Result<String, SnmpError>;

    /// Release the transport.
    fn close(&mut self);
}

/// Opens sessions. One connector is shared by all pollers in a process.
pub trait SnmpConnector: Send + Sync {
    fn open(
        &self,
        host: &str,
        port: u16,
        auth: &SnmpAuth,
        timeout: Duration,
    ) -> Result<Box<dyn SnmpSession>, SnmpError>;
}
