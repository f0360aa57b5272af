// ABOUTME: OAuth token encryption using ChaCha20-Poly1305 AEAD
// ABOUTME: Key is derived with HKDF-SHA256 from the configured server secret
//
// Provider access and refresh tokens are only needed again when a member
// withdraws (to unlink the app at Kakao or revoke the grant at Google), so they
// are sealed before storage. Rotating the server secret makes old tokens
// unreadable; unlinking then degrades to a logged warning.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use ring::{
    aead::{self, Nonce, UnboundKey},
    error::Unspecified,
    hkdf,
    rand::{SecureRandom, SystemRandom},
};
use std::sync::Arc;

/// Salt for key derivation (constant, not secret)
const APP_SALT: &[u8] = b"laundrylens-token-encryption-v1";

/// HKDF info label binding the key to this purpose
const KEY_INFO: &[u8] = b"oauth-token-encryption";

/// Nonce size for ChaCha20-Poly1305
const NONCE_SIZE: usize = 12;

#[derive(Debug, thiserror::Error)]
pub enum EncryptionError {
    #[error("Failed to generate random data: {0}")]
    RandomGeneration(String),

    #[error("Failed to encrypt data: {0}")]
    Encryption(String),

    #[error("Failed to decrypt data: {0}")]
    Decryption(String),

    #[error("Failed to derive encryption key: {0}")]
    KeyDerivation(String),

    #[error("Invalid encrypted data format")]
    InvalidFormat,
}

impl From<Unspecified> for EncryptionError {
    fn from(_: Unspecified) -> Self {
        EncryptionError::Encryption("Cryptographic operation failed".to_string())
    }
}

/// Seals and opens short secrets such as OAuth tokens
#[derive(Clone)]
pub struct TokenCipher {
    rng: Arc<SystemRandom>,
    encryption_key: Arc<[u8; 32]>,
}

impl std::fmt::Debug for TokenCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCipher").finish_non_exhaustive()
    }
}

impl TokenCipher {
    /// Derive a 256-bit key from `secret`
    pub fn from_secret(secret: &str) -> Result<Self, EncryptionError> {
        if secret.is_empty() {
            return Err(EncryptionError::KeyDerivation(
                "Secret must not be empty".to_string(),
            ));
        }

        let salt = hkdf::Salt::new(hkdf::HKDF_SHA256, APP_SALT);
        let prk = salt.extract(secret.as_bytes());

        let mut encryption_key = [0u8; 32];
        prk.expand(&[KEY_INFO], hkdf::HKDF_SHA256)
            .map_err(|_| EncryptionError::KeyDerivation("HKDF expansion failed".to_string()))?
            .fill(&mut encryption_key)
            .map_err(|_| EncryptionError::KeyDerivation("Key fill failed".to_string()))?;

        Ok(Self {
            rng: Arc::new(SystemRandom::new()),
            encryption_key: Arc::new(encryption_key),
        })
    }

    /// Encrypt a token
    /// Returns base64-encoded: nonce || ciphertext || tag
    pub fn encrypt(&self, plaintext: &str) -> Result<String, EncryptionError> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        self.rng.fill(&mut nonce_bytes).map_err(|_| {
            EncryptionError::RandomGeneration("Failed to generate nonce".to_string())
        })?;

        let nonce = Nonce::try_assume_unique_for_key(&nonce_bytes)?;
        let unbound_key = UnboundKey::new(&aead::CHACHA20_POLY1305, &self.encryption_key[..])?;
        let sealing_key = aead::LessSafeKey::new(unbound_key);

        let mut in_out = plaintext.as_bytes().to_vec();
        sealing_key
            .seal_in_place_append_tag(nonce, aead::Aad::empty(), &mut in_out)
            .map_err(|_| EncryptionError::Encryption("Seal operation failed".to_string()))?;

        let mut result = Vec::with_capacity(NONCE_SIZE + in_out.len());
        result.extend_from_slice(&nonce_bytes);
        result.extend_from_slice(&in_out);

        Ok(BASE64.encode(&result))
    }

    /// Decrypt a value produced by [`TokenCipher::encrypt`]
    pub fn decrypt(&self, ciphertext: &str) -> Result<String, EncryptionError> {
        let encrypted_data = BASE64
            .decode(ciphertext)
            .map_err(|_| EncryptionError::InvalidFormat)?;

        if encrypted_data.len() < NONCE_SIZE + aead::CHACHA20_POLY1305.tag_len() {
            return Err(EncryptionError::InvalidFormat);
        }

        let (nonce_bytes, ciphertext_and_tag) = encrypted_data.split_at(NONCE_SIZE);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)?;

        let unbound_key = UnboundKey::new(&aead::CHACHA20_POLY1305, &self.encryption_key[..])?;
        let opening_key = aead::LessSafeKey::new(unbound_key);

        let mut in_out = ciphertext_and_tag.to_vec();
        let plaintext = opening_key
            .open_in_place(nonce, aead::Aad::empty(), &mut in_out)
            .map_err(|_| EncryptionError::Decryption("Open operation failed".to_string()))?;

        String::from_utf8(plaintext.to_vec())
            .map_err(|_| EncryptionError::Decryption("Invalid UTF-8 in decrypted data".to_string()))
    }

    /// Encrypt an optional token, passing `None` through
    pub fn encrypt_opt(&self, plaintext: Option<&str>) -> Result<Option<String>, EncryptionError> {
        plaintext.map(|p| self.encrypt(p)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let cipher = TokenCipher::from_secret("server-secret").unwrap();
        let plaintext = "kakao-access-token-1234567890";

        let encrypted = cipher.encrypt(plaintext).unwrap();
        assert_ne!(encrypted, plaintext);
        assert_eq!(cipher.decrypt(&encrypted).unwrap(), plaintext);
    }

    #[test]
    fn test_different_nonces() {
        let cipher = TokenCipher::from_secret("server-secret").unwrap();

        let encrypted1 = cipher.encrypt("token").unwrap();
        let encrypted2 = cipher.encrypt("token").unwrap();

        // Same plaintext should produce different ciphertext (different nonces)
        assert_ne!(encrypted1, encrypted2);
        assert_eq!(cipher.decrypt(&encrypted1).unwrap(), "token");
        assert_eq!(cipher.decrypt(&encrypted2).unwrap(), "token");
    }

    #[test]
    fn test_same_secret_same_key() {
        let a = TokenCipher::from_secret("shared").unwrap();
        let b = TokenCipher::from_secret("shared").unwrap();
        let encrypted = a.encrypt("google-refresh").unwrap();
        assert_eq!(b.decrypt(&encrypted).unwrap(), "google-refresh");
    }

    #[test]
    fn test_wrong_secret_fails() {
        let a = TokenCipher::from_secret("one").unwrap();
        let b = TokenCipher::from_secret("two").unwrap();
        let encrypted = a.encrypt("token").unwrap();
        assert!(matches!(
            b.decrypt(&encrypted),
            Err(EncryptionError::Decryption(_))
        ));
    }

    #[test]
    fn test_decrypt_invalid_data() {
        let cipher = TokenCipher::from_secret("server-secret").unwrap();

        assert!(cipher.decrypt("not-valid-base64!@#").is_err());
        assert!(cipher.decrypt(&BASE64.encode(b"short")).is_err());
        assert!(cipher.decrypt(&BASE64.encode(vec![0u8; 50])).is_err());
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            TokenCipher::from_secret(""),
            Err(EncryptionError::KeyDerivation(_))
        ));
    }

    #[test]
    fn test_encrypt_opt() {
        let cipher = TokenCipher::from_secret("server-secret").unwrap();
        assert_eq!(cipher.encrypt_opt(None).unwrap(), None);
        let sealed = cipher.encrypt_opt(Some("t")).unwrap().unwrap();
        assert_eq!(cipher.decrypt(&sealed).unwrap(), "t");
    }
}
