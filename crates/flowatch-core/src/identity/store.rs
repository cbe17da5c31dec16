// ── Encrypted identity vault ──
//
// On disk the vault is a single JSON envelope: a random salt plus one
// AES-256-GCM blob whose plaintext is the serialized identity map.
// Every mutation re-encrypts with a fresh nonce and replaces the file
// atomically, so a crash mid-write never leaves an undecryptable vault.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::identity::crypto::{self, KEY_LEN};
use crate::identity::{Identity, Provider, Summary};

/// Errors surfaced by the identity vault.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to decrypt identity store (wrong password?)")]
    WrongPassword,

    #[error("corrupt identity store: {0}")]
    Corrupt(String),

    #[error("identity '{0}' not found")]
    NotFound(String),

    #[error("identity '{0}' already exists")]
    Duplicate(String),

    #[error("vault cryptography failed: {0}")]
    Crypto(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Serialized form of the vault file.
#[derive(Serialize, Deserialize)]
struct Envelope {
    salt: String,
    data: String,
}

struct StoreInner {
    key: [u8; KEY_LEN],
    salt: Vec<u8>,
    identities: BTreeMap<String, Identity>,
}

/// File-backed [`Provider`] with authenticated encryption at rest.
pub struct FileStore {
    path: PathBuf,
    inner: Mutex<StoreInner>,
}

impl FileStore {
    /// Open the vault at `path`, creating an empty one (and the file) if
    /// it does not exist yet.
    pub fn open(path: impl Into<PathBuf>, password: &SecretString) -> Result<Self, StoreError> {
        let path = path.into();
        let secret = password.expose_secret().as_bytes();

        let raw = match std::fs::read(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let salt = crypto::generate_salt();
                let key = crypto::derive_key(secret, &salt)?;
                let store = Self {
                    path,
                    inner: Mutex::new(StoreInner {
                        key,
                        salt: salt.to_vec(),
                        identities: BTreeMap::new(),
                    }),
                };
                store.save(&store.lock())?;
                debug!(path = %store.path.display(), "created empty identity store");
                return Ok(store);
            }
            Err(err) => return Err(err.into()),
        };

        let envelope: Envelope = serde_json::from_slice(&raw)
            .map_err(|e| StoreError::Corrupt(format!("bad envelope: {e}")))?;
        let salt = BASE64
            .decode(&envelope.salt)
            .map_err(|e| StoreError::Corrupt(format!("bad salt encoding: {e}")))?;
        let sealed = BASE64
            .decode(&envelope.data)
            .map_err(|e| StoreError::Corrupt(format!("bad data encoding: {e}")))?;

        let key = crypto::derive_key(secret, &salt)?;
        let plaintext = crypto::open(&key, &sealed)?;

        let identities: BTreeMap<String, Identity> = serde_json::from_slice(&plaintext)
            .map_err(|e| StoreError::Corrupt(format!("bad identity data: {e}")))?;

        Ok(Self {
            path,
            inner: Mutex::new(StoreInner {
                key,
                salt,
                identities,
            }),
        })
    }

    /// Location of the vault file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Re-encrypt the identity map (fresh nonce) and replace the file
    /// atomically: sibling temp file, fsync, rename.
    fn save(&self, inner: &StoreInner) -> Result<(), StoreError> {
        let plaintext = serde_json::to_vec(&inner.identities)
            .map_err(|e| StoreError::Corrupt(format!("serialize failed: {e}")))?;
        let sealed = crypto::seal(&inner.key, &plaintext)?;

        let envelope = Envelope {
            salt: BASE64.encode(&inner.salt),
            data: BASE64.encode(&sealed),
        };
        let raw = serde_json::to_vec(&envelope)
            .map_err(|e| StoreError::Corrupt(format!("serialize failed: {e}")))?;

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&raw)?;
        tmp.as_file().sync_all()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }

        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

impl Provider for FileStore {
    fn list(&self) -> Result<Vec<Summary>, StoreError> {
        let inner = self.lock();
        Ok(inner.identities.values().map(Identity::summarize).collect())
    }

    fn get(&self, name: &str) -> Result<Identity, StoreError> {
        let inner = self.lock();
        inner
            .identities
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    fn add(&self, identity: Identity) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner.identities.contains_key(&identity.name) {
            return Err(StoreError::Duplicate(identity.name));
        }
        inner.identities.insert(identity.name.clone(), identity);
        self.save(&inner)
    }

    fn update(&self, name: &str, identity: Identity) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if !inner.identities.contains_key(name) {
            return Err(StoreError::NotFound(name.to_string()));
        }
        if name != identity.name {
            inner.identities.remove(name);
        }
        inner.identities.insert(identity.name.clone(), identity);
        self.save(&inner)
    }

    fn remove(&self, name: &str) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner.identities.remove(name).is_none() {
            return Err(StoreError::NotFound(name.to_string()));
        }
        self.save(&inner)
    }
}
