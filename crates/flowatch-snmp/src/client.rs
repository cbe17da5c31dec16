// ── snmp2-backed connector and session ──
//
// The only module in the workspace that touches the wire library. Keeps
// snmp2 types out of every signature above it: the engine sees
// `SnmpSession` / `SnmpConnector` and nothing else.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::Utc;
use snmp2::{v3, Oid, SyncSession, Value};
use tracing::debug;

use crate::auth::{AuthProtocol, PrivProtocol, SnmpAuth};
use crate::error::SnmpError;
use crate::oids;
use crate::session::{CounterSample, InterfaceInfo, OperStatus, SnmpConnector, SnmpSession};

/// Attempts per GET before the error is surfaced (initial try + retries).
const GET_ATTEMPTS: usize = 3;

/// Repetitions per GETBULK round while walking a column.
const BULK_REPETITIONS: u32 = 20;

/// Connector binding UDP sessions with the `snmp2` client library.
#[derive(Debug, Default)]
pub struct UdpConnector;

impl UdpConnector {
    pub fn new() -> Self {
        Self
    }
}

impl SnmpConnector for UdpConnector {
    fn open(
        &self,
        host: &str,
        port: u16,
        auth: &SnmpAuth,
        timeout: Duration,
    ) -> Result<Box<dyn SnmpSession>, SnmpError> {
        let addr = format!("{host}:{port}");
        let connect = |reason: String| SnmpError::Connect {
            host: addr.clone(),
            reason,
        };

        let inner = match auth {
            SnmpAuth::V1 { community } => {
                SyncSession::new_v1(addr.as_str(), community.as_bytes(), Some(timeout), 0)
                    .map_err(|e| connect(format!("{e:?}")))?
            }
            SnmpAuth::V2c { community } => {
                SyncSession::new_v2c(addr.as_str(), community.as_bytes(), Some(timeout), 0)
                    .map_err(|e| connect(format!("{e:?}")))?
            }
            SnmpAuth::V3 {
                username,
                auth,
                privacy,
            } => {
                let security = match auth {
                    Some((proto, passphrase)) => {
                        let mut security =
                            v3::Security::new(username.as_bytes(), passphrase.as_bytes())
                                .with_auth_protocol(auth_protocol(*proto));
                        if let Some((priv_proto, priv_pass)) = privacy {
                            security = security
                                .with_privacy(privacy_protocol(*priv_proto), priv_pass.as_bytes());
                        }
                        security
                    }
                    None => v3::Security::new(username.as_bytes(), b""),
                };
                SyncSession::new_v3(addr.as_str(), Some(timeout), 0, security)
                    .map_err(|e| connect(format!("{e:?}")))?
            }
        };

        Ok(Box::new(ClientSession { inner }))
    }
}

fn auth_protocol(proto: AuthProtocol) -> v3::AuthProtocol {
    match proto {
        AuthProtocol::Md5 => v3::AuthProtocol::Md5,
        AuthProtocol::Sha => v3::AuthProtocol::Sha1,
        AuthProtocol::Sha256 => v3::AuthProtocol::Sha256,
        AuthProtocol::Sha512 => v3::AuthProtocol::Sha512,
    }
}

fn privacy_protocol(proto: PrivProtocol) -> v3::PrivacyProtocol {
    match proto {
        PrivProtocol::Des => v3::PrivacyProtocol::Des,
        PrivProtocol::Aes128 => v3::PrivacyProtocol::Aes128,
        PrivProtocol::Aes192 => v3::PrivacyProtocol::Aes192,
        PrivProtocol::Aes256 => v3::PrivacyProtocol::Aes256,
    }
}

/// A live UDP session to one agent.
pub struct ClientSession {
    inner: SyncSession,
}

/// Owned rendering of the varbind values this crate consumes.
enum Scalar {
    Text(String),
    Number(u64),
    Signed(i64),
    Other,
}

impl Scalar {
    fn from_value(value: &Value<'_>) -> Self {
        match value {
            Value::OctetString(bytes) => Self::Text(String::from_utf8_lossy(bytes).into_owned()),
            Value::Integer(n) => Self::Signed(*n),
            Value::Counter32(n) | Value::Unsigned32(n) | Value::Timeticks(n) => {
                Self::Number(u64::from(*n))
            }
            Value::Counter64(n) => Self::Number(*n),
            _ => Self::Other,
        }
    }

    fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Signed(n) if *n >= 0 => Some(*n as u64),
            _ => None,
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Signed(n) => Some(*n),
            Self::Number(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }
}

impl ClientSession {
    /// GET a single OID with bounded retries, returning an owned value.
    fn get_scalar(&mut self, parts: &[u32], index: Option<u32>) -> Result<Scalar, SnmpError> {
        let oid = build_oid(parts, index)?;
        let oid_text = dotted(parts, index);

        let mut last_err = SnmpError::MissingValue {
            oid: oid_text.clone(),
        };
        for attempt in 0..GET_ATTEMPTS {
            match self.inner.get(&oid) {
                Ok(pdu) => {
                    if let Some((_name, value)) = pdu.varbinds.into_iter().next() {
                        return Ok(Scalar::from_value(&value));
                    }
                    return Err(SnmpError::MissingValue { oid: oid_text });
                }
                Err(err) => {
                    debug!(oid = %oid_text, attempt, error = ?err, "SNMP GET attempt failed");
                    last_err = err.into();
                }
            }
        }
        Err(last_err)
    }

    /// Bulk-walk one column, calling `visit(if_index, value)` per row.
    fn walk_column(
        &mut self,
        base: &[u32],
        mut visit: impl FnMut(u32, Scalar),
    ) -> Result<(), SnmpError> {
        let prefix = format!("{}.", dotted(base, None));
        let mut cursor: Vec<u32> = base.to_vec();

        'rounds: loop {
            let oid = build_oid(&cursor, None)?;
            let pdu = self.inner.getbulk(&[&oid], 0, BULK_REPETITIONS)?;

            let mut next_cursor: Option<Vec<u32>> = None;

            for (name, value) in pdu.varbinds {
                let text = name.to_string();
                if !text.starts_with(&prefix) {
                    break 'rounds;
                }
                if matches!(value, Value::EndOfMibView) {
                    break 'rounds;
                }
                if let Some(if_index) = last_arc(&text) {
                    visit(if_index, Scalar::from_value(&value));
                }
                next_cursor = parse_dotted(&text);
            }

            match next_cursor {
                // Guard against agents that fail to advance the cursor.
                Some(next) if next != cursor => cursor = next,
                _ => break,
            }
        }
        Ok(())
    }
}

impl SnmpSession for ClientSession {
    fn counters(&mut self, if_index: u32) -> Result<CounterSample, SnmpError> {
        let in_octets = self
            .get_scalar(oids::IF_HC_IN_OCTETS, Some(if_index))?
            .as_u64()
            .ok_or(SnmpError::UnexpectedType {
                oid: dotted(oids::IF_HC_IN_OCTETS, Some(if_index)),
            })?;
        let out_octets = self
            .get_scalar(oids::IF_HC_OUT_OCTETS, Some(if_index))?
            .as_u64()
            .ok_or(SnmpError::UnexpectedType {
                oid: dotted(oids::IF_HC_OUT_OCTETS, Some(if_index)),
            })?;

        Ok(CounterSample {
            in_octets,
            out_octets,
            timestamp: Utc::now(),
        })
    }

    fn oper_status(&mut self, if_index: u32) -> Result<OperStatus, SnmpError> {
        let raw = self
            .get_scalar(oids::IF_OPER_STATUS, Some(if_index))?
            .as_i64()
            .ok_or(SnmpError::UnexpectedType {
                oid: dotted(oids::IF_OPER_STATUS, Some(if_index)),
            })?;
        Ok(OperStatus::from_raw(raw))
    }

    fn walk_interfaces(&mut self) -> Result<BTreeMap<u32, InterfaceInfo>, SnmpError> {
        let mut table: BTreeMap<u32, InterfaceInfo> = BTreeMap::new();

        self.walk_column(oids::IF_NAME, |idx, value| {
            if let Scalar::Text(name) = value {
                row(&mut table, idx).name = name;
            }
        })?;

        self.walk_column(oids::IF_DESCR, |idx, value| {
            if let Scalar::Text(descr) = value {
                let entry = row(&mut table, idx);
                if entry.name.is_empty() {
                    entry.name = descr.clone();
                }
                entry.description = descr;
            }
        })?;

        self.walk_column(oids::IF_ALIAS, |idx, value| {
            if let Scalar::Text(alias) = value {
                row(&mut table, idx).alias = alias;
            }
        })?;

        self.walk_column(oids::IF_HIGH_SPEED, |idx, value| {
            if let Some(speed) = value.as_u64() {
                row(&mut table, idx).speed_mbps = speed;
            }
        })?;

        self.walk_column(oids::IF_OPER_STATUS, |idx, value| {
            if let Some(raw) = value.as_i64() {
                row(&mut table, idx).status = OperStatus::from_raw(raw);
            }
        })?;

        Ok(table)
    }

    fn system_description(&mut self) -> Result<String, SnmpError> {
        match self.get_scalar(oids::SYS_DESCR, None)? {
            Scalar::Text(descr) => Ok(descr),
            _ => Err(SnmpError::UnexpectedType {
                oid: dotted(oids::SYS_DESCR, None),
            }),
        }
    }

    fn close(&mut self) {
        // SyncSession releases its socket on drop; nothing else to do.
    }
}

fn row(table: &mut BTreeMap<u32, InterfaceInfo>, idx: u32) -> &mut InterfaceInfo {
    table.entry(idx).or_insert_with(|| InterfaceInfo {
        if_index: idx,
        ..InterfaceInfo::default()
    })
}

// ── OID helpers ──────────────────────────────────────────────────────

fn build_oid(parts: &[u32], index: Option<u32>) -> Result<Oid<'static>, SnmpError> {
    let mut arcs: Vec<u64> = parts.iter().map(|&p| u64::from(p)).collect();
    if let Some(idx) = index {
        arcs.push(u64::from(idx));
    }
    Oid::from(&arcs[..]).map_err(|_| SnmpError::InvalidOid)
}

fn dotted(parts: &[u32], index: Option<u32>) -> String {
    let mut text = parts
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(".");
    if let Some(idx) = index {
        text.push('.');
        text.push_str(&idx.to_string());
    }
    text
}

fn parse_dotted(text: &str) -> Option<Vec<u32>> {
    text.split('.').map(|arc| arc.parse().ok()).collect()
}

fn last_arc(text: &str) -> Option<u32> {
    text.rsplit('.').next().and_then(|arc| arc.parse().ok())
}
