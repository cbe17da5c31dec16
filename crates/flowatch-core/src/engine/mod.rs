// ── Polling engine ──
//
// One Poller per running dashboard, multiplexed by the SessionManager.
// Leaves first: the ring and rate modules are pure; the poller composes
// them with the SNMP facade and the identity provider.

pub mod discover;
pub mod manager;
pub mod poller;
pub mod rate;
pub mod ring;
pub mod snapshot;
pub mod stream;

#[cfg(test)]
pub(crate) mod testutil;
