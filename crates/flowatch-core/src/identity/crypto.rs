// ── Vault cryptography ──
//
// Argon2id stretches the master password into an AES-256 key; the vault
// body is sealed with AES-256-GCM, fresh 12-byte nonce per save, nonce
// prepended to the ciphertext. Any integrity failure on open is reported
// as a wrong password — callers cannot distinguish tampering.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::identity::store::StoreError;

pub(crate) const SALT_LEN: usize = 16;
pub(crate) const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

const ARGON_TIME_COST: u32 = 1;
const ARGON_MEM_KIB: u32 = 64 * 1024;
const ARGON_LANES: u32 = 4;

/// Derive the 32-byte vault key from a master password and salt.
pub(crate) fn derive_key(password: &[u8], salt: &[u8]) -> Result<[u8; KEY_LEN], StoreError> {
    let params = Params::new(ARGON_MEM_KIB, ARGON_TIME_COST, ARGON_LANES, Some(KEY_LEN))
        .map_err(|e| StoreError::Crypto(e.to_string()))?;
    let argon = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = [0u8; KEY_LEN];
    argon
        .hash_password_into(password, salt, &mut key)
        .map_err(|e| StoreError::Crypto(e.to_string()))?;
    Ok(key)
}

/// Generate a fresh random salt.
pub(crate) fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Encrypt `plaintext`, returning nonce ‖ ciphertext.
pub(crate) fn seal(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<Vec<u8>, StoreError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|_| StoreError::Crypto("encryption failed".into()))?;

    let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    sealed.extend_from_slice(nonce.as_slice());
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

/// Decrypt nonce-prepended ciphertext produced by [`seal`].
pub(crate) fn open(key: &[u8; KEY_LEN], sealed: &[u8]) -> Result<Vec<u8>, StoreError> {
    if sealed.len() < NONCE_LEN {
        return Err(StoreError::WrongPassword);
    }
    let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| StoreError::WrongPassword)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let key = derive_key(b"password", &generate_salt()).unwrap();
        let sealed = seal(&key, b"hello interfaces").unwrap();
        let plaintext = open(&key, &sealed).unwrap();
        assert_eq!(plaintext, b"hello interfaces");
    }

    #[test]
    fn wrong_key_fails_integrity() {
        let salt = generate_salt();
        let key = derive_key(b"correct", &salt).unwrap();
        let other = derive_key(b"wrong", &salt).unwrap();

        let sealed = seal(&key, b"payload").unwrap();
        assert!(matches!(open(&other, &sealed), Err(StoreError::WrongPassword)));
    }

    #[test]
    fn tampered_ciphertext_fails_integrity() {
        let key = derive_key(b"password", &generate_salt()).unwrap();
        let mut sealed = seal(&key, b"payload").unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0x01;
        assert!(matches!(open(&key, &sealed), Err(StoreError::WrongPassword)));
    }

    #[test]
    fn nonce_is_fresh_per_seal() {
        let key = derive_key(b"password", &generate_salt()).unwrap();
        let a = seal(&key, b"same").unwrap();
        let b = seal(&key, b"same").unwrap();
        assert_ne!(a[..NONCE_LEN], b[..NONCE_LEN]);
    }

    #[test]
    fn truncated_input_is_rejected() {
        let key = derive_key(b"password", &generate_salt()).unwrap();
        assert!(open(&key, &[0u8; 4]).is_err());
    }

    #[test]
    fn same_password_same_salt_same_key() {
        let salt = generate_salt();
        assert_eq!(
            derive_key(b"p", &salt).unwrap(),
            derive_key(b"p", &salt).unwrap()
        );
    }
}
