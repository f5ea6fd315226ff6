//! At-rest sealing for the file-backed client store.
//!
//! The store holds the auth token, so [`crate::store::FileStore`] can seal its
//! document with a passphrase before writing it.
//!
//! # Example
//!
//! ```ignore
//! use newsdesk::storage;
//!
//! let sealed = storage::seal(b"{\"token\":\"abc\"}", "passphrase")?;
//! let opened = storage::open(&sealed, "passphrase")?;
//! ```

use aes_gcm::{
    aead::{Aead, AeadCore},
    Aes256Gcm, Key, KeyInit,
};
use argon2::Argon2;
use base64::{engine::general_purpose, Engine as _};
use rand::{rngs::OsRng, RngCore};
use thiserror::Error;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;

/// Errors that can occur while reading or writing persisted client state.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed: {0}")]
    Decryption(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

fn derive_key(passphrase: &str, salt: &[u8]) -> Result<Key<Aes256Gcm>, StorageError> {
    let mut output_key_material = [0u8; 32];
    Argon2::default()
        .hash_password_into(passphrase.as_bytes(), salt, &mut output_key_material)
        .map_err(|e| StorageError::Encryption(e.to_string()))?;

    Ok(*Key::<Aes256Gcm>::from_slice(&output_key_material))
}

/// Seals `plaintext` with AES-256-GCM under a key derived from `passphrase` via Argon2.
///
/// Layout is `salt | nonce | ciphertext`. Salt and nonce are random per call.
pub fn seal(plaintext: &[u8], passphrase: &str) -> Result<Vec<u8>, StorageError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let key = derive_key(passphrase, &salt)?;
    let cipher = Aes256Gcm::new(&key);
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let encrypted = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| StorageError::Encryption(e.to_string()))?;

    let mut combined = Vec::with_capacity(SALT_LEN + NONCE_LEN + encrypted.len());
    combined.extend_from_slice(&salt);
    combined.extend_from_slice(&nonce);
    combined.extend_from_slice(&encrypted);

    Ok(combined)
}

/// Reverses [`seal`].
pub fn open(data: &[u8], passphrase: &str) -> Result<Vec<u8>, StorageError> {
    if data.len() < SALT_LEN + NONCE_LEN {
        return Err(StorageError::InvalidFormat(
            "Data too short to contain salt and nonce".to_string(),
        ));
    }

    let (salt, rest) = data.split_at(SALT_LEN);
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);
    let nonce = aes_gcm::Nonce::from_slice(nonce_bytes);

    let key = derive_key(passphrase, salt)?;
    let cipher = Aes256Gcm::new(&key);

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|e| StorageError::Decryption(e.to_string()))
}

pub fn seal_base64(plaintext: &[u8], passphrase: &str) -> Result<String, StorageError> {
    Ok(general_purpose::STANDARD.encode(seal(plaintext, passphrase)?))
}

pub fn open_base64(encoded: &str, passphrase: &str) -> Result<Vec<u8>, StorageError> {
    let data = general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| StorageError::InvalidFormat(e.to_string()))?;
    open(&data, passphrase)
}
