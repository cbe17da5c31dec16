use thiserror::Error;

/// Errors produced by the SNMP facade.
#[derive(Debug, Error)]
pub enum SnmpError {
    #[error("unsupported SNMP version: {0}")]
    UnsupportedVersion(String),

    #[error("unsupported protocol name: {0}")]
    UnsupportedProtocol(String),

    #[error("invalid OID")]
    InvalidOid,

    #[error("failed to open SNMP session for {host}: {reason}")]
    Connect { host: String, reason: String },

    #[error("SNMP request failed: {0}")]
    Request(String),

    #[error("no value in response for {oid}")]
    MissingValue { oid: String },

    #[error("unexpected value type for {oid}")]
    UnexpectedType { oid: String },
}

impl From<snmp2::Error> for SnmpError {
    fn from(err: snmp2::Error) -> Self {
        Self::Request(format!("{err:?}"))
    }
}
