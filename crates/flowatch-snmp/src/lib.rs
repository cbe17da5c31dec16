//! SNMP session facade for flowatch.
//!
//! Wraps the external `snmp2` wire library behind a narrow trait surface:
//! [`SnmpConnector`] opens per-target sessions, [`SnmpSession`] exposes the
//! handful of IF-MIB operations the engine needs (counter GETs, operational
//! status, interface-table walks). Everything above this crate depends only
//! on the traits, so the engine is testable without a device on the wire.

pub mod auth;
pub mod client;
pub mod error;
pub mod oids;
pub mod session;

pub use auth::{AuthProtocol, PrivProtocol, SnmpAuth, SnmpVersion};
pub use client::UdpConnector;
pub use error::SnmpError;
pub use session::{CounterSample, InterfaceInfo, OperStatus, SnmpConnector, SnmpSession};
