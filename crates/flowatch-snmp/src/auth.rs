// ── SNMP authentication parameters ──
//
// Credential-shaped connection parameters for v1/v2c/v3. These types
// carry the data needed to configure a session; the encrypted identity
// vault persists them (hence the serde derives with on-the-wire names
// matching what operators type: "2c", "SHA256", "AES128", ...).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SnmpError;

/// SNMP protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnmpVersion {
    #[serde(rename = "1")]
    V1,
    #[serde(rename = "2c")]
    V2c,
    #[serde(rename = "3")]
    V3,
}

impl fmt::Display for SnmpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => f.write_str("1"),
            Self::V2c => f.write_str("2c"),
            Self::V3 => f.write_str("3"),
        }
    }
}

impl FromStr for SnmpVersion {
    type Err = SnmpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" => Ok(Self::V1),
            "2c" => Ok(Self::V2c),
            "3" => Ok(Self::V3),
            other => Err(SnmpError::UnsupportedVersion(other.to_string())),
        }
    }
}

/// SNMPv3 authentication protocol (USM).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthProtocol {
    #[serde(rename = "MD5")]
    Md5,
    #[serde(rename = "SHA")]
    Sha,
    #[serde(rename = "SHA256")]
    Sha256,
    #[serde(rename = "SHA512")]
    Sha512,
}

impl fmt::Display for AuthProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Md5 => f.write_str("MD5"),
            Self::Sha => f.write_str("SHA"),
            Self::Sha256 => f.write_str("SHA256"),
            Self::Sha512 => f.write_str("SHA512"),
        }
    }
}

impl FromStr for AuthProtocol {
    type Err = SnmpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MD5" => Ok(Self::Md5),
            "SHA" => Ok(Self::Sha),
            "SHA256" => Ok(Self::Sha256),
            "SHA512" => Ok(Self::Sha512),
            other => Err(SnmpError::UnsupportedProtocol(other.to_string())),
        }
    }
}

/// SNMPv3 privacy protocol (USM).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrivProtocol {
    #[serde(rename = "DES")]
    Des,
    #[serde(rename = "AES128")]
    Aes128,
    #[serde(rename = "AES192")]
    Aes192,
    #[serde(rename = "AES256")]
    Aes256,
}

impl fmt::Display for PrivProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Des => f.write_str("DES"),
            Self::Aes128 => f.write_str("AES128"),
            Self::Aes192 => f.write_str("AES192"),
            Self::Aes256 => f.write_str("AES256"),
        }
    }
}

impl FromStr for PrivProtocol {
    type Err = SnmpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DES" => Ok(Self::Des),
            // Bare "AES" is common shorthand on network gear.
            "AES" | "AES128" => Ok(Self::Aes128),
            "AES192" => Ok(Self::Aes192),
            "AES256" => Ok(Self::Aes256),
            other => Err(SnmpError::UnsupportedProtocol(other.to_string())),
        }
    }
}

/// Everything a connector needs to authenticate a session.
///
/// For v3 the message security level is derived from which passphrases are
/// present: both auth and privacy set means authPriv, auth alone means
/// authNoPriv, neither means noAuthNoPriv.
#[derive(Debug, Clone)]
pub enum SnmpAuth {
    V1 {
        community: String,
    },
    V2c {
        community: String,
    },
    V3 {
        username: String,
        auth: Option<(AuthProtocol, String)>,
        privacy: Option<(PrivProtocol, String)>,
    },
}

impl SnmpAuth {
    pub fn version(&self) -> SnmpVersion {
        match self {
            Self::V1 { .. } => SnmpVersion::V1,
            Self::V2c { .. } => SnmpVersion::V2c,
            Self::V3 { .. } => SnmpVersion::V3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_round_trips_through_strings() {
        for v in [SnmpVersion::V1, SnmpVersion::V2c, SnmpVersion::V3] {
            assert_eq!(v.to_string().parse::<SnmpVersion>().unwrap(), v);
        }
    }

    #[test]
    fn unknown_version_is_rejected() {
        assert!(matches!(
            "4".parse::<SnmpVersion>(),
            Err(SnmpError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn bare_aes_means_aes128() {
        assert_eq!("AES".parse::<PrivProtocol>().unwrap(), PrivProtocol::Aes128);
        assert_eq!("aes256".parse::<PrivProtocol>().unwrap(), PrivProtocol::Aes256);
    }

    #[test]
    fn serde_names_match_operator_spelling() {
        let v: SnmpVersion = serde_json::from_str("\"2c\"").unwrap();
        assert_eq!(v, SnmpVersion::V2c);
        let p: AuthProtocol = serde_json::from_str("\"SHA256\"").unwrap();
        assert_eq!(p, AuthProtocol::Sha256);
    }
}
