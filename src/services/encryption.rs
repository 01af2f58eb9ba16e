// src/services/encryption.rs
//! AES-256-GCM encryption for sensitive settings values (OAuth tokens,
//! client secrets). Values are stored as base64(nonce || ciphertext).

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::RngCore;
use std::env;
use thiserror::Error;

// 96-bit nonce, as required by GCM
const NONCE_LEN: usize = 12;

#[derive(Debug, Error)]
pub enum EncryptionError {
    #[error("Encryption key not configured")]
    KeyNotConfigured,

    #[error("Invalid encryption key format")]
    InvalidKeyFormat,

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Invalid encrypted data format")]
    InvalidDataFormat,
}

pub struct EncryptionService {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for EncryptionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionService")
            .field("cipher", &"<redacted>")
            .finish()
    }
}

impl EncryptionService {
    /// Initialize from the ENCRYPTION_MASTER_KEY environment variable
    pub fn from_env() -> Result<Self, EncryptionError> {
        let key_str =
            env::var("ENCRYPTION_MASTER_KEY").map_err(|_| EncryptionError::KeyNotConfigured)?;

        Self::from_key(&key_str)
    }

    /// Initialize from a base64-encoded 32-byte key
    pub fn from_key(key_str: &str) -> Result<Self, EncryptionError> {
        let key_bytes = BASE64
            .decode(key_str.as_bytes())
            .map_err(|_| EncryptionError::InvalidKeyFormat)?;

        if key_bytes.len() != 32 {
            return Err(EncryptionError::InvalidKeyFormat);
        }

        let key = aes_gcm::Key::<Aes256Gcm>::from_slice(&key_bytes);

        Ok(Self {
            cipher: Aes256Gcm::new(key),
        })
    }

    /// Generate a new random base64-encoded key
    pub fn generate_key() -> String {
        let mut key = [0u8; 32];
        OsRng.fill_bytes(&mut key);
        BASE64.encode(key)
    }

    /// Encrypt a plaintext string; each call uses a fresh random nonce
    pub fn encrypt(&self, plaintext: &str) -> Result<String, EncryptionError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| EncryptionError::EncryptionFailed(e.to_string()))?;

        let mut combined = nonce_bytes.to_vec();
        combined.extend_from_slice(&ciphertext);

        Ok(BASE64.encode(combined))
    }

    /// Decrypt a base64-encoded nonce || ciphertext value
    pub fn decrypt(&self, encrypted: &str) -> Result<String, EncryptionError> {
        let combined = BASE64
            .decode(encrypted.as_bytes())
            .map_err(|_| EncryptionError::InvalidDataFormat)?;

        if combined.len() < NONCE_LEN {
            return Err(EncryptionError::InvalidDataFormat);
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext_bytes = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|e| EncryptionError::DecryptionFailed(e.to_string()))?;

        String::from_utf8(plaintext_bytes)
            .map_err(|_| EncryptionError::DecryptionFailed("invalid UTF-8".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_key_is_usable() {
        let key = EncryptionService::generate_key();
        assert!(!key.is_empty());
        assert!(EncryptionService::from_key(&key).is_ok());
    }

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let key = EncryptionService::generate_key();
        let service = EncryptionService::from_key(&key).unwrap();

        let plaintext = "v^1.1#i^1#refresh_token_value";
        let encrypted = service.encrypt(plaintext).unwrap();

        assert_ne!(encrypted, plaintext);
        assert_eq!(service.decrypt(&encrypted).unwrap(), plaintext);
    }

    #[test]
    fn test_random_nonce_varies_ciphertext() {
        let key = EncryptionService::generate_key();
        let service = EncryptionService::from_key(&key).unwrap();

        let encrypted1 = service.encrypt("same_token").unwrap();
        let encrypted2 = service.encrypt("same_token").unwrap();

        assert_ne!(encrypted1, encrypted2);
        assert_eq!(service.decrypt(&encrypted1).unwrap(), "same_token");
        assert_eq!(service.decrypt(&encrypted2).unwrap(), "same_token");
    }

    #[test]
    fn test_invalid_key_rejected() {
        assert!(EncryptionService::from_key("too_short").is_err());
    }

    #[test]
    fn test_decrypt_garbage_fails() {
        let key = EncryptionService::generate_key();
        let service = EncryptionService::from_key(&key).unwrap();

        assert!(service.decrypt("not_base64!!").is_err());
        assert!(service.decrypt("YWJj").is_err()); // shorter than a nonce
    }
}
