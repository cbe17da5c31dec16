// ── Per-session polling worker ──
//
// One Poller owns everything for one running dashboard: its SNMP
// sessions, the previous-counter baselines, and the per-interface state.
// Construction performs the synchronous prefill (no network) so external
// observers can render immediately; `run` drives the periodic cycle until
// the cancellation token fires.
//
// Locking: the state lock is held exclusively for a whole poll cycle and
// shared for snapshot reads. Rings carry their own lock, so concurrent
// snapshot copies do not serialize on the poller lock.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::dashboard::{Dashboard, Target};
use crate::engine::rate::{rate, utilization};
use crate::engine::snapshot::{
    Event, GroupSnapshot, InterfaceStats, SessionInfo, SessionState, Snapshot, TargetStats,
};
use crate::engine::stream::EventStream;
use crate::error::CoreError;
use crate::identity::Provider;
use flowatch_snmp::{CounterSample, InterfaceInfo, OperStatus, SnmpConnector, SnmpSession};

/// Per-request timeout for SNMP operations inside a poll cycle.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

struct PollerState {
    /// One open session per target host, created lazily on first use.
    clients: HashMap<String, Box<dyn SnmpSession>>,
    targets: HashMap<String, TargetStats>,
    /// Previous counter baseline per (host, ifIndex).
    prev: HashMap<(String, u32), CounterSample>,
    poll_count: u64,
    error_count: u64,
    last_poll: Option<DateTime<Utc>>,
}

/// Polling worker for a single dashboard.
pub struct Poller {
    dash: Dashboard,
    provider: Arc<dyn Provider>,
    connector: Arc<dyn SnmpConnector>,
    state: RwLock<PollerState>,
    events: watch::Sender<Arc<Event>>,
    cancel: CancellationToken,
}

impl Poller {
    /// Build the poller and prefill empty stats for every configured
    /// target and interface. No network I/O happens here; the event
    /// channel starts out holding the prefill snapshot.
    pub(crate) fn new(
        dash: Dashboard,
        provider: Arc<dyn Provider>,
        connector: Arc<dyn SnmpConnector>,
    ) -> Self {
        let mut targets = HashMap::new();
        for group in &dash.groups {
            for target in &group.targets {
                targets.insert(
                    target.host.clone(),
                    TargetStats {
                        host: target.host.clone(),
                        label: target.label.clone(),
                        interfaces: target
                            .interfaces
                            .iter()
                            .map(|name| InterfaceStats::new(name, dash.max_history))
                            .collect(),
                        last_error: None,
                        last_poll: None,
                    },
                );
            }
        }

        let state = PollerState {
            clients: HashMap::new(),
            targets,
            prev: HashMap::new(),
            poll_count: 0,
            error_count: 0,
            last_poll: None,
        };

        let prefill = build_snapshot(&dash, &state);
        let (events, _) = watch::channel(Arc::new(Event {
            session: dash.name.clone(),
            snapshot: prefill,
        }));

        Self {
            dash,
            provider,
            connector,
            state: RwLock::new(state),
            events,
            cancel: CancellationToken::new(),
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dash
    }

    /// Drive the polling loop until [`stop`](Self::stop) is called.
    ///
    /// The first tick fires immediately, so the first poll happens on
    /// entry; each cycle runs on the blocking pool because the SNMP
    /// library performs synchronous socket I/O.
    pub(crate) async fn run(self: Arc<Self>) {
        info!(session = %self.dash.name, interval_secs = self.dash.interval_secs, "poller started");

        let mut ticker = tokio::time::interval(self.dash.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let poller = Arc::clone(&self);
                    if let Err(err) = tokio::task::spawn_blocking(move || poller.poll_cycle()).await {
                        warn!(session = %self.dash.name, error = %err, "poll cycle aborted");
                    }
                }
            }
        }

        self.cleanup();
        info!(session = %self.dash.name, "poller stopped");
    }

    /// Signal the polling loop to exit. A cycle already in flight runs to
    /// completion before the loop observes the signal.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Point-in-time deep copy of the session state.
    pub fn snapshot(&self) -> Snapshot {
        let st = self.state.read().unwrap_or_else(PoisonError::into_inner);
        build_snapshot(&self.dash, &st)
    }

    /// Subscribe to poll-cycle events. The stream holds at most the
    /// latest event; a consumer that never reads costs the poller nothing.
    pub fn subscribe(&self) -> EventStream {
        EventStream::new(self.events.subscribe())
    }

    pub fn info(&self) -> SessionInfo {
        let st = self.state.read().unwrap_or_else(PoisonError::into_inner);
        SessionInfo {
            name: self.dash.name.clone(),
            state: SessionState::Running,
            last_poll: st.last_poll,
            poll_count: st.poll_count,
            error_count: st.error_count,
        }
    }

    // ── Poll cycle ───────────────────────────────────────────────────

    /// Execute a single poll cycle across all targets, then publish the
    /// resulting snapshot to subscribers (non-blocking, depth 1).
    pub(crate) fn poll_cycle(&self) {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let st = &mut *guard;

        for group in &self.dash.groups {
            for target in &group.targets {
                self.poll_target(st, target);
            }
        }

        st.poll_count += 1;
        st.last_poll = Some(Utc::now());
        let snapshot = build_snapshot(&self.dash, st);
        drop(guard);

        self.events.send_replace(Arc::new(Event {
            session: self.dash.name.clone(),
            snapshot,
        }));
    }

    fn poll_target(&self, st: &mut PollerState, target: &Target) {
        // Open the session lazily. Credential resolution happens here and
        // nowhere else; a failure is recorded on the target and the rest
        // of the cycle continues.
        if !st.clients.contains_key(&target.host) {
            match self.open_client(target) {
                Ok(client) => {
                    st.clients.insert(target.host.clone(), client);
                }
                Err(err) => {
                    st.error_count += 1;
                    if let Some(stats) = st.targets.get_mut(&target.host) {
                        stats.last_error = Some(err.to_string());
                    }
                    warn!(host = %target.host, error = %err, "failed to open SNMP session");
                    return;
                }
            }
        }

        let unresolved = st
            .targets
            .get(&target.host)
            .is_some_and(|stats| stats.interfaces.iter().any(|i| i.if_index == 0));
        if unresolved {
            self.resolve_interfaces(st, target);
        }

        let now = Utc::now();
        let PollerState {
            clients,
            targets,
            prev,
            error_count,
            ..
        } = st;
        let (Some(client), Some(stats)) =
            (clients.get_mut(&target.host), targets.get_mut(&target.host))
        else {
            return;
        };

        for iface in &mut stats.interfaces {
            // Unresolved interfaces are retried by the walk next cycle.
            if iface.if_index == 0 {
                continue;
            }

            let counters = match client.counters(iface.if_index) {
                Ok(counters) => counters,
                Err(err) => {
                    // History, rates, and the baseline stay untouched.
                    iface.last_error = Some(err.to_string());
                    *error_count += 1;
                    debug!(host = %target.host, if_index = iface.if_index, error = %err, "counter read failed");
                    continue;
                }
            };

            iface.status = client
                .oper_status(iface.if_index)
                .unwrap_or(OperStatus::Unknown);

            let key = (target.host.clone(), iface.if_index);
            if let Some(prev_sample) = prev.get(&key) {
                match rate(prev_sample, &counters) {
                    Ok(sample) => {
                        iface.in_bps = sample.in_bps;
                        iface.out_bps = sample.out_bps;
                        iface.utilization =
                            utilization(sample.in_bps, sample.out_bps, iface.speed_mbps);
                        iface.history.add(sample);
                    }
                    Err(err) => {
                        // Routine: wrap means the device re-initialized.
                        // Skip the sample, keep the new baseline below.
                        debug!(host = %target.host, if_index = iface.if_index, reason = %err, "rate sample skipped");
                    }
                }
            }
            prev.insert(key, counters);

            iface.last_poll = Some(now);
            iface.last_error = None;
        }

        stats.last_poll = Some(now);
        stats.last_error = None;
    }

    /// Walk the interface table and bind configured interface names to
    /// ifIndex values. Name is the primary match key; the description is
    /// the fallback. Unmatched interfaces stay at ifIndex 0 and are
    /// retried next cycle.
    fn resolve_interfaces(&self, st: &mut PollerState, target: &Target) {
        let table = {
            let Some(client) = st.clients.get_mut(&target.host) else {
                return;
            };
            match client.walk_interfaces() {
                Ok(table) => table,
                Err(err) => {
                    st.error_count += 1;
                    if let Some(stats) = st.targets.get_mut(&target.host) {
                        stats.last_error = Some(err.to_string());
                    }
                    warn!(host = %target.host, error = %err, "interface walk failed");
                    return;
                }
            }
        };

        let mut by_label: HashMap<&str, &InterfaceInfo> = HashMap::new();
        for info in table.values() {
            if !info.description.is_empty() && info.description != info.name {
                by_label.insert(info.description.as_str(), info);
            }
        }
        // Inserted second so a name match always wins over a description.
        for info in table.values() {
            if !info.name.is_empty() {
                by_label.insert(info.name.as_str(), info);
            }
        }

        let Some(stats) = st.targets.get_mut(&target.host) else {
            return;
        };
        for iface in stats.interfaces.iter_mut().filter(|i| i.if_index == 0) {
            if let Some(info) = by_label.get(iface.name.as_str()) {
                iface.if_index = info.if_index;
                iface.speed_mbps = info.speed_mbps;
                iface.description = info.description.clone();
                debug!(host = %target.host, name = %iface.name, if_index = info.if_index, "resolved interface");
            }
        }
    }

    /// Resolve the target's credential and open a session. The identity
    /// is dropped as soon as the client is configured.
    fn open_client(&self, target: &Target) -> Result<Box<dyn SnmpSession>, CoreError> {
        let identity = self.provider.get(&target.identity)?;
        let client =
            self.connector
                .open(&target.host, target.port, &identity.to_auth(), REQUEST_TIMEOUT)?;
        Ok(client)
    }

    fn cleanup(&self) {
        let mut st = self.state.write().unwrap_or_else(PoisonError::into_inner);
        for (_, mut client) in st.clients.drain() {
            client.close();
        }
    }
}

fn build_snapshot(dash: &Dashboard, st: &PollerState) -> Snapshot {
    let groups = dash
        .groups
        .iter()
        .map(|group| GroupSnapshot {
            name: group.name.clone(),
            targets: group
                .targets
                .iter()
                .filter_map(|target| st.targets.get(&target.host).map(TargetStats::snapshot))
                .collect(),
        })
        .collect();

    Snapshot {
        name: dash.name.clone(),
        groups,
        last_poll: st.last_poll,
        poll_count: st.poll_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testutil::{counter, dashboard, v2c_identity, MapProvider, MockConnector, MockDevice};

    fn poller_for(dash: Dashboard, connector: MockConnector) -> Poller {
        let provider = Arc::new(MapProvider::with(v2c_identity("lab")));
        Poller::new(dash, provider, Arc::new(connector))
    }

    #[test]
    fn prefill_renders_before_any_network_io() {
        let dash = dashboard("edge", &[("10.0.0.1", &["eth0", "eth1"])]);
        let poller = poller_for(dash, MockConnector::default());

        let snap = poller.snapshot();
        assert_eq!(snap.poll_count, 0);
        assert_eq!(snap.groups.len(), 1);
        let target = &snap.groups[0].targets[0];
        assert_eq!(target.interfaces.len(), 2);
        assert_eq!(target.interfaces[0].if_index, 0);
        assert!(target.interfaces[0].history.is_empty());

        // Subscribers see the same prefill snapshot straight away.
        let stream = poller.subscribe();
        assert_eq!(stream.current().snapshot.poll_count, 0);
        assert_eq!(stream.current().snapshot.groups.len(), 1);
    }

    #[test]
    fn second_poll_produces_rates() {
        let device = MockDevice::new().with_interface(7, "eth0", "Ethernet0", 1000);
        device.push_counters(7, counter(0, 1000, 500));
        device.push_counters(7, counter(10, 2000, 1500));

        let dash = dashboard("edge", &[("10.0.0.1", &["eth0"])]);
        let poller = poller_for(dash, MockConnector::default().with_device("10.0.0.1", device));

        poller.poll_cycle();
        let snap = poller.snapshot();
        let iface = &snap.groups[0].targets[0].interfaces[0];
        assert_eq!(iface.if_index, 7);
        assert_eq!(iface.speed_mbps, 1000);
        assert!(iface.history.is_empty(), "first poll only sets the baseline");

        poller.poll_cycle();
        let snap = poller.snapshot();
        let iface = &snap.groups[0].targets[0].interfaces[0];
        assert_eq!(iface.in_bps, 800.0);
        assert_eq!(iface.out_bps, 800.0);
        assert_eq!(iface.history.len(), 1);
        assert!(iface.utilization > 0.0);
        assert_eq!(snap.poll_count, 2);
    }

    #[test]
    fn counter_wrap_skips_sample_and_advances_baseline() {
        let device = MockDevice::new().with_interface(7, "eth0", "Ethernet0", 1000);
        device.push_counters(7, counter(0, 1000, 500));
        device.push_counters(7, counter(10, 2000, 1500));
        // Device reboot: inOctets restarts near zero.
        device.push_counters(7, counter(20, 50, 1500));
        // Clean sample after the restart.
        device.push_counters(7, counter(30, 1050, 2500));

        let dash = dashboard("edge", &[("10.0.0.1", &["eth0"])]);
        let poller = poller_for(dash, MockConnector::default().with_device("10.0.0.1", device));

        poller.poll_cycle();
        poller.poll_cycle();
        poller.poll_cycle(); // wrap

        let snap = poller.snapshot();
        let iface = &snap.groups[0].targets[0].interfaces[0];
        assert_eq!(iface.history.len(), 1, "wrap must not append a sample");
        assert!(iface.last_poll.is_some(), "lastPoll still advances on wrap");
        assert!(iface.last_error.is_none());

        poller.poll_cycle(); // recovery against the new baseline

        let snap = poller.snapshot();
        let iface = &snap.groups[0].targets[0].interfaces[0];
        assert_eq!(iface.history.len(), 2);
        assert_eq!(iface.history[1].in_bps, 800.0);
    }

    #[test]
    fn transport_error_leaves_history_and_baseline_untouched() {
        let device = MockDevice::new().with_interface(7, "eth0", "Ethernet0", 1000);
        device.push_counters(7, counter(0, 1000, 500));
        // No sample scripted for the second cycle: counters() fails.
        let dash = dashboard("edge", &[("10.0.0.1", &["eth0"])]);
        let poller = poller_for(
            dash,
            MockConnector::default().with_device("10.0.0.1", device.clone()),
        );

        poller.poll_cycle();
        poller.poll_cycle();

        let snap = poller.snapshot();
        let iface = &snap.groups[0].targets[0].interfaces[0];
        assert!(iface.last_error.is_some());
        assert!(iface.history.is_empty());

        // The baseline is still the t=0 sample, so the next clean read
        // rates over the full 20 seconds.
        device.push_counters(7, counter(20, 3000, 2500));
        poller.poll_cycle();

        let snap = poller.snapshot();
        let iface = &snap.groups[0].targets[0].interfaces[0];
        assert_eq!(iface.history.len(), 1);
        assert_eq!(iface.history[0].in_bps, 800.0);
        assert!(iface.last_error.is_none());
    }

    #[test]
    fn credential_failure_is_isolated_to_its_target() {
        let device = MockDevice::new().with_interface(1, "eth0", "Ethernet0", 1000);
        device.push_counters(1, counter(0, 10, 10));

        let mut dash = dashboard("edge", &[("10.0.0.1", &["eth0"]), ("10.0.0.2", &["eth0"])]);
        dash.groups[0].targets[1].identity = "missing".into();

        let poller = poller_for(dash, MockConnector::default().with_device("10.0.0.1", device));
        poller.poll_cycle();

        let snap = poller.snapshot();
        let healthy = &snap.groups[0].targets[0];
        assert!(healthy.last_error.is_none());
        assert_eq!(healthy.interfaces[0].status, OperStatus::Up);

        let broken = &snap.groups[0].targets[1];
        let err = broken.last_error.as_deref().unwrap_or_default();
        assert!(err.contains("not found"), "unexpected error: {err}");

        // The session itself keeps running.
        let info = poller.info();
        assert_eq!(info.state, SessionState::Running);
        assert_eq!(info.poll_count, 1);
        assert!(info.error_count >= 1);
    }

    #[test]
    fn interface_matched_by_description_fallback() {
        let device = MockDevice::new().with_interface(3, "Gi0/0", "GigabitEthernet0/0", 1000);
        device.push_counters(3, counter(0, 1, 1));

        let dash = dashboard("edge", &[("10.0.0.1", &["GigabitEthernet0/0"])]);
        let poller = poller_for(dash, MockConnector::default().with_device("10.0.0.1", device));
        poller.poll_cycle();

        let snap = poller.snapshot();
        let iface = &snap.groups[0].targets[0].interfaces[0];
        assert_eq!(iface.if_index, 3);
        assert_eq!(iface.description, "GigabitEthernet0/0");
    }

    #[test]
    fn unknown_interface_stays_unresolved_and_unpolled() {
        let device = MockDevice::new().with_interface(1, "eth0", "Ethernet0", 1000);
        device.push_counters(1, counter(0, 1, 1));

        let dash = dashboard("edge", &[("10.0.0.1", &["eth0", "does-not-exist"])]);
        let poller = poller_for(dash, MockConnector::default().with_device("10.0.0.1", device));
        poller.poll_cycle();

        let snap = poller.snapshot();
        let missing = &snap.groups[0].targets[0].interfaces[1];
        assert_eq!(missing.if_index, 0);
        assert!(missing.history.is_empty());
        assert!(missing.last_poll.is_none());
    }

    #[test]
    fn slow_subscriber_never_stalls_the_poller() {
        let device = MockDevice::new().with_interface(1, "eth0", "Ethernet0", 1000);
        for i in 0..20 {
            device.push_counters(1, counter(i * 10, (i as u64) * 1000, (i as u64) * 500));
        }

        let dash = dashboard("edge", &[("10.0.0.1", &["eth0"])]);
        let poller = poller_for(dash, MockConnector::default().with_device("10.0.0.1", device));

        // Subscriber that never reads.
        let stream = poller.subscribe();

        for _ in 0..10 {
            poller.poll_cycle();
        }

        assert_eq!(poller.snapshot().poll_count, 10);
        // The channel buffered only the latest event.
        assert_eq!(stream.latest().snapshot.poll_count, 10);
    }

    #[test]
    fn ring_timestamps_strictly_increase() {
        let device = MockDevice::new().with_interface(1, "eth0", "Ethernet0", 1000);
        for i in 0..6 {
            device.push_counters(1, counter(i * 10, (i as u64) * 1000, (i as u64) * 500));
        }

        let dash = dashboard("edge", &[("10.0.0.1", &["eth0"])]);
        let poller = poller_for(dash, MockConnector::default().with_device("10.0.0.1", device));
        for _ in 0..6 {
            poller.poll_cycle();
        }

        let snap = poller.snapshot();
        let history = &snap.groups[0].targets[0].interfaces[0].history;
        assert_eq!(history.len(), 5);
        for pair in history.windows(2) {
            assert!(pair[1].timestamp > pair[0].timestamp);
        }
    }

    #[test]
    fn history_is_bounded_by_dashboard_depth() {
        let device = MockDevice::new().with_interface(1, "eth0", "Ethernet0", 1000);
        for i in 0..10 {
            device.push_counters(1, counter(i * 10, (i as u64) * 1000, (i as u64) * 500));
        }

        let mut dash = dashboard("edge", &[("10.0.0.1", &["eth0"])]);
        dash.max_history = 3;

        let poller = poller_for(dash, MockConnector::default().with_device("10.0.0.1", device));
        for _ in 0..10 {
            poller.poll_cycle();
        }

        let snap = poller.snapshot();
        assert_eq!(snap.groups[0].targets[0].interfaces[0].history.len(), 3);
    }
}
