// flowatch-core: polling engine, session manager, and identity vault.

pub mod dashboard;
pub mod engine;
pub mod error;
pub mod identity;

// ── Primary re-exports ──────────────────────────────────────────────
pub use dashboard::{Dashboard, Group, Target};
pub use error::CoreError;

pub use engine::discover::discover_interfaces;
pub use engine::manager::SessionManager;
pub use engine::poller::Poller;
pub use engine::rate::{rate, utilization, RateError, RateSample};
pub use engine::ring::Ring;
pub use engine::snapshot::{
    Event, GroupSnapshot, InterfaceSnapshot, SessionInfo, SessionState, Snapshot, TargetSnapshot,
};
pub use engine::stream::{EventStream, EventWatchStream};

pub use identity::store::{FileStore, StoreError};
pub use identity::{Identity, Provider, Summary};

// Re-export the facade types callers routinely touch alongside the engine.
pub use flowatch_snmp::{
    AuthProtocol, CounterSample, InterfaceInfo, OperStatus, PrivProtocol, SnmpAuth, SnmpConnector,
    SnmpError, SnmpSession, SnmpVersion,
};
