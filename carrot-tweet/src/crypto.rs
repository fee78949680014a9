//! Authenticated encryption for values handed to clients.
//!
//! [`SealingKey`] wraps AES-256-GCM. A sealed value is `base64url(nonce || ciphertext)` with a
//! fresh random 96-bit nonce per value; the GCM tag at the end of the ciphertext means a
//! sealed value cannot be altered or forged without the key.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use base64::{Engine as _, engine::general_purpose};
use sha2::{Digest, Sha256};

const NONCE_LEN: usize = 12;

/// AES-256-GCM key derived from an application secret.
#[derive(Clone)]
pub struct SealingKey {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for SealingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SealingKey(..)")
    }
}

impl SealingKey {
    /// Derive the key as SHA-256 of `secret`.
    pub fn derive(secret: &str) -> Self {
        let key = Sha256::digest(secret.as_bytes());
        Self {
            cipher: Aes256Gcm::new(&key),
        }
    }

    /// Encrypt `plaintext`, returning a URL-safe string.
    pub fn seal(&self, plaintext: &[u8]) -> Result<String, anyhow::Error> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|e| anyhow::anyhow!("Encryption failed: {}", e))?;

        let mut sealed = nonce.to_vec();
        sealed.extend_from_slice(&ciphertext);

        Ok(general_purpose::URL_SAFE_NO_PAD.encode(sealed))
    }

    /// Decrypt a value produced by [`SealingKey::seal`] with the same key.
    ///
    /// Fails for anything malformed, truncated, tampered with or sealed under another key.
    pub fn open(&self, sealed: &str) -> Result<Vec<u8>, anyhow::Error> {
        let data = general_purpose::URL_SAFE_NO_PAD
            .decode(sealed)
            .map_err(|e| anyhow::anyhow!("Failed to decode sealed data: {}", e))?;

        if data.len() < NONCE_LEN {
            return Err(anyhow::anyhow!("Sealed data too short"));
        }

        let (nonce_bytes, ciphertext) = data.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        self.cipher
            .decrypt(nonce, ciphertext)
            .map_err(|e| anyhow::anyhow!("Decryption failed: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "a-test-secret-key-that-is-long-enough";

    #[test]
    fn test_seal_and_open() {
        let key = SealingKey::derive(SECRET);
        let sealed = key.seal(b"{\"id\":7}").unwrap();

        assert!(sealed.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(key.open(&sealed).unwrap(), b"{\"id\":7}");
    }

    #[test]
    fn test_nonce_is_fresh() {
        let key = SealingKey::derive(SECRET);
        assert_ne!(key.seal(b"same").unwrap(), key.seal(b"same").unwrap());
    }

    #[test]
    fn test_open_with_other_key_fails() {
        let sealed = SealingKey::derive(SECRET).seal(b"payload").unwrap();
        let other = SealingKey::derive("some-other-secret-that-is-also-long");
        assert!(other.open(&sealed).is_err());
    }

    #[test]
    fn test_tampered_value_fails() {
        let key = SealingKey::derive(SECRET);
        let sealed = key.seal(b"payload").unwrap();

        let mut bytes = general_purpose::URL_SAFE_NO_PAD.decode(&sealed).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let tampered = general_purpose::URL_SAFE_NO_PAD.encode(bytes);

        assert!(key.open(&tampered).is_err());
    }

    #[test]
    fn test_truncated_and_garbage_fail() {
        let key = SealingKey::derive(SECRET);
        let sealed = key.seal(b"payload").unwrap();

        assert!(key.open(&sealed[..10]).is_err());
        assert!(key.open("").is_err());
        assert!(key.open("not base64 at all!").is_err());
    }
}
