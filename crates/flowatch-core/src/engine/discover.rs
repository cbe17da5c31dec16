// ── One-shot interface discovery ──

use std::time::Duration;

use crate::dashboard::DEFAULT_SNMP_PORT;
use crate::error::CoreError;
use crate::identity::Identity;
use flowatch_snmp::{InterfaceInfo, SnmpConnector};

/// Timeout for discovery connects; more generous than the poll path.
const DISCOVER_TIMEOUT: Duration = Duration::from_secs(10);

/// Walk a device's interface table and return every discovered interface
/// with name, description, alias, speed, and status, ordered by ifIndex.
///
/// Used by front-ends to help operators pick interface names for a
/// dashboard. Blocking call; run it off the async runtime.
pub fn discover_interfaces(
    connector: &dyn SnmpConnector,
    host: &str,
    port: u16,
    identity: &Identity,
) -> Result<Vec<InterfaceInfo>, CoreError> {
    let port = if port == 0 { DEFAULT_SNMP_PORT } else { port };

    let mut session = connector.open(host, port, &identity.to_auth(), DISCOVER_TIMEOUT)?;
    let table = session.walk_interfaces()?;
    session.close();

    Ok(table.into_values().collect())
}
