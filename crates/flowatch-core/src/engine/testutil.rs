// Shared in-memory doubles for engine tests: a scripted SNMP device, a
// connector serving them by host, and a map-backed identity provider.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{TimeZone, Utc};

use crate::dashboard::{Dashboard, Group, Target};
use crate::identity::store::StoreError;
use crate::identity::{Identity, Provider, Summary};
use flowatch_snmp::{
    CounterSample, InterfaceInfo, OperStatus, SnmpAuth, SnmpConnector, SnmpError, SnmpSession,
    SnmpVersion,
};

pub(crate) fn counter(secs: i64, in_octets: u64, out_octets: u64) -> CounterSample {
    CounterSample {
        in_octets,
        out_octets,
        timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
    }
}

pub(crate) fn v2c_identity(name: &str) -> Identity {
    Identity {
        name: name.into(),
        version: SnmpVersion::V2c,
        community: "public".into(),
        username: String::new(),
        auth_proto: None,
        auth_pass: String::new(),
        priv_proto: None,
        priv_pass: String::new(),
    }
}

/// One group, identity "lab" on every target, 1s interval.
pub(crate) fn dashboard(name: &str, targets: &[(&str, &[&str])]) -> Dashboard {
    Dashboard {
        name: name.into(),
        default_identity: "lab".into(),
        interval_secs: 1,
        max_history: 360,
        groups: vec![Group {
            name: "Default".into(),
            targets: targets
                .iter()
                .map(|(host, interfaces)| Target {
                    host: (*host).into(),
                    label: String::new(),
                    identity: "lab".into(),
                    port: 161,
                    interfaces: interfaces.iter().map(|i| (*i).to_string()).collect(),
                })
                .collect(),
        }],
    }
}

/// A scripted SNMP agent: fixed interface table, queued counter samples.
#[derive(Clone, Default)]
pub(crate) struct MockDevice {
    interfaces: BTreeMap<u32, InterfaceInfo>,
    counters: Arc<Mutex<HashMap<u32, VecDeque<CounterSample>>>>,
    status: OperStatus,
}

impl MockDevice {
    pub fn new() -> Self {
        Self {
            status: OperStatus::Up,
            ..Self::default()
        }
    }

    pub fn with_interface(mut self, if_index: u32, name: &str, description: &str, speed_mbps: u64) -> Self {
        self.interfaces.insert(
            if_index,
            InterfaceInfo {
                if_index,
                name: name.into(),
                description: description.into(),
                alias: String::new(),
                speed_mbps,
                status: OperStatus::Up,
            },
        );
        self
    }

    /// Queue the sample the next `counters()` call will return.
    pub fn push_counters(&self, if_index: u32, sample: CounterSample) {
        self.counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(if_index)
            .or_default()
            .push_back(sample);
    }
}

impl SnmpSession for MockDevice {
    fn counters(&mut self, if_index: u32) -> Result<CounterSample, SnmpError> {
        self.counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&if_index)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| SnmpError::Request(format!("no scripted sample for ifIndex {if_index}")))
    }

    fn oper_status(&mut self, _if_index: u32) -> Result<OperStatus, SnmpError> {
        Ok(self.status)
    }

    fn walk_interfaces(&mut self) -> Result<BTreeMap<u32, InterfaceInfo>, SnmpError> {
        Ok(self.interfaces.clone())
    }

    fn system_description(&mut self) -> Result<String, SnmpError> {
        Ok("mock agent".into())
    }

    fn close(&mut self) {}
}

/// Serves mock devices by host name.
#[derive(Default)]
pub(crate) struct MockConnector {
    devices: HashMap<String, MockDevice>,
}

impl MockConnector {
    pub fn with_device(mut self, host: &str, device: MockDevice) -> Self {
        self.devices.insert(host.into(), device);
        self
    }
}

impl SnmpConnector for MockConnector {
    fn open(
        &self,
        host: &str,
        _port: u16,
        _auth: &SnmpAuth,
        _timeout: Duration,
    ) -> Result<Box<dyn SnmpSession>, SnmpError> {
        self.devices
            .get(host)
            .cloned()
            .map(|device| Box::new(device) as Box<dyn SnmpSession>)
            .ok_or_else(|| SnmpError::Connect {
                host: host.to_string(),
                reason: "no such mock device".into(),
            })
    }
}

/// In-memory identity provider.
pub(crate) struct MapProvider {
    identities: Mutex<HashMap<String, Identity>>,
}

impl MapProvider {
    pub fn with(identity: Identity) -> Self {
        let mut identities = HashMap::new();
        identities.insert(identity.name.clone(), identity);
        Self {
            identities: Mutex::new(identities),
        }
    }
}

impl Provider for MapProvider {
    fn list(&self) -> Result<Vec<Summary>, StoreError> {
        Ok(self
            .identities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(Identity::summarize)
            .collect())
    }

    fn get(&self, name: &str) -> Result<Identity, StoreError> {
        self.identities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    fn add(&self, identity: Identity) -> Result<(), StoreError> {
        let mut identities = self.identities.lock().unwrap_or_else(PoisonError::into_inner);
        if identities.contains_key(&identity.name) {
            return Err(StoreError::Duplicate(identity.name));
        }
        identities.insert(identity.name.clone(), identity);
        Ok(())
    }

    fn update(&self, name: &str, identity: Identity) -> Result<(), StoreError> {
        let mut identities = self.identities.lock().unwrap_or_else(PoisonError::into_inner);
        if !identities.contains_key(name) {
            return Err(StoreError::NotFound(name.to_string()));
        }
        if name != identity.name {
            identities.remove(name);
        }
        identities.insert(identity.name.clone(), identity);
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<(), StoreError> {
        self.identities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }
}
