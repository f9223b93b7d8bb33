//! At-rest obfuscation for mined secret keys
//!
//! [`XorKeystreamCipher`] XORs the plaintext with the key repeated across its
//! length. It hides keys from casual inspection of the database; it is not
//! authenticated and does not resist an attacker who can read the table and
//! guess plaintext structure.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

/// Key length taken from the master secret
pub const CIPHER_KEY_LEN: usize = 32;

/// Key material used when no master secret is configured
pub const FALLBACK_MASTER_SECRET: &str = "launchpad-vanity-default-master-secret";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CipherError {
    #[error("Ciphertext is not valid base64: {0}")]
    Encoding(String),
}

/// Symmetric byte cipher for secret keys at rest
pub trait SymmetricCipher: Send + Sync {
    fn encrypt(&self, plaintext: &[u8]) -> Vec<u8>;

    fn decrypt(&self, ciphertext: &[u8]) -> Vec<u8>;

    /// Encrypt and encode for a text column
    fn seal(&self, plaintext: &[u8]) -> String {
        STANDARD.encode(self.encrypt(plaintext))
    }

    /// Decode a text column and decrypt
    fn open(&self, sealed: &str) -> Result<Vec<u8>, CipherError> {
        let ciphertext = STANDARD
            .decode(sealed)
            .map_err(|e| CipherError::Encoding(e.to_string()))?;
        Ok(self.decrypt(&ciphertext))
    }
}

/// Repeating-key XOR stream keyed by the first 32 bytes of a master secret
#[derive(Clone)]
pub struct XorKeystreamCipher {
    key: Vec<u8>,
}

impl XorKeystreamCipher {
    /// Derive the key from the server master secret; unset or empty secrets
    /// fall back to [`FALLBACK_MASTER_SECRET`].
    pub fn from_master_secret(master_secret: Option<&str>) -> Self {
        let secret = match master_secret {
            Some(secret) if !secret.is_empty() => secret,
            _ => FALLBACK_MASTER_SECRET,
        };
        let bytes = secret.as_bytes();
        let key = bytes[..bytes.len().min(CIPHER_KEY_LEN)].to_vec();
        Self { key }
    }

    pub fn key_len(&self) -> usize {
        self.key.len()
    }

    fn apply(&self, input: &[u8]) -> Vec<u8> {
        input
            .iter()
            .zip(self.key.iter().cycle())
            .map(|(byte, key)| byte ^ key)
            .collect()
    }
}

impl SymmetricCipher for XorKeystreamCipher {
    fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        self.apply(plaintext)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Vec<u8> {
        self.apply(ciphertext)
    }
}

impl std::fmt::Debug for XorKeystreamCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XorKeystreamCipher")
            .field("key_len", &self.key.len())
            .finish()
    }
}
