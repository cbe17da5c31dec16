// ── SNMP identities (credential profiles) ──
//
// An Identity carries everything needed to authenticate against a device.
// Secrets never cross a listing boundary: `Summary` is a distinct type
// with no secret fields, and `Identity`'s Debug impl redacts them.

pub mod crypto;
pub mod store;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identity::store::StoreError;
use flowatch_snmp::{AuthProtocol, PrivProtocol, SnmpAuth, SnmpVersion};

/// An SNMP credential profile as persisted in the vault.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub version: SnmpVersion,

    /// v1/v2c community string.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub community: String,

    /// v3 security name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_proto: Option<AuthProtocol>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub auth_pass: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priv_proto: Option<PrivProtocol>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub priv_pass: String,
}

impl Identity {
    /// Translate into connection parameters for the SNMP facade.
    ///
    /// v3 security level falls out of which passphrases are present;
    /// privacy is only honoured when authentication is also configured.
    pub fn to_auth(&self) -> SnmpAuth {
        match self.version {
            SnmpVersion::V1 => SnmpAuth::V1 {
                community: self.community.clone(),
            },
            SnmpVersion::V2c => SnmpAuth::V2c {
                community: self.community.clone(),
            },
            SnmpVersion::V3 => {
                let auth = match (self.auth_proto, self.auth_pass.is_empty()) {
                    (Some(proto), false) => Some((proto, self.auth_pass.clone())),
                    _ => None,
                };
                let privacy = match (&auth, self.priv_proto, self.priv_pass.is_empty()) {
                    (Some(_), Some(proto), false) => Some((proto, self.priv_pass.clone())),
                    _ => None,
                };
                SnmpAuth::V3 {
                    username: self.username.clone(),
                    auth,
                    privacy,
                }
            }
        }
    }

    /// Secret-free projection for listings.
    pub fn summarize(&self) -> Summary {
        Summary {
            name: self.name.clone(),
            version: self.version,
            username: (!self.username.is_empty()).then(|| self.username.clone()),
            auth_proto: self.auth_proto,
            priv_proto: self.priv_proto,
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("community", &redact(&self.community))
            .field("username", &self.username)
            .field("auth_proto", &self.auth_proto)
            .field("auth_pass", &redact(&self.auth_pass))
            .field("priv_proto", &self.priv_proto)
            .field("priv_pass", &redact(&self.priv_pass))
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        ""
    } else {
        "<redacted>"
    }
}

/// What a listing is allowed to reveal about an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub name: String,
    pub version: SnmpVersion,
    pub username: Option<String>,
    pub auth_proto: Option<AuthProtocol>,
    pub priv_proto: Option<PrivProtocol>,
}

/// Capability set handed to consumers of the vault.
///
/// The polling engine only calls `get`, and only at the moment it opens
/// an SNMP session; management front-ends use the rest.
pub trait Provider: Send + Sync {
    fn list(&self) -> Result<Vec<Summary>, StoreError>;
    fn get(&self, name: &str) -> Result<Identity, StoreError>;
    fn add(&self, identity: Identity) -> Result<(), StoreError>;
    fn update(&self, name: &str, identity: Identity) -> Result<(), StoreError>;
    fn remove(&self, name: &str) -> Result<(), StoreError>;
}
