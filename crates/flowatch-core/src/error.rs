use thiserror::Error;

use crate::identity::store::StoreError;
use flowatch_snmp::SnmpError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("session '{name}' is already running")]
    SessionExists { name: String },

    #[error("session '{name}' not found")]
    SessionNotFound { name: String },

    #[error("invalid dashboard '{name}': {reason}")]
    InvalidDashboard { name: String, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Snmp(#[from] SnmpError),
}
