// ── IF-MIB OIDs consumed by the monitor ──
//
// Columnar OIDs are walked or indexed by appending the ifIndex arc.

/// ifName (IF-MIB::ifName).
pub const IF_NAME: &[u32] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 1];

/// ifDescr (IF-MIB::ifDescr).
pub const IF_DESCR: &[u32] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 2];

/// ifAlias (IF-MIB::ifAlias).
pub const IF_ALIAS: &[u32] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 18];

/// ifHCInOctets, 64-bit receive octet counter.
pub const IF_HC_IN_OCTETS: &[u32] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 6];

/// ifHCOutOctets, 64-bit transmit octet counter.
pub const IF_HC_OUT_OCTETS: &[u32] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 10];

/// ifHighSpeed, interface speed in Mbps.
pub const IF_HIGH_SPEED: &[u32] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 15];

/// ifOperStatus (1 up, 2 down, 3 testing).
pub const IF_OPER_STATUS: &[u32] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 8];

/// sysDescr.0, used for connectivity tests.
pub const SYS_DESCR: &[u32] = &[1, 3, 6, 1, 2, 1, 1, 1, 0];
