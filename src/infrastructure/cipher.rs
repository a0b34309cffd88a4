use crate::domain::account::EncryptedField;
use crate::domain::ports::Cipher;
use crate::error::{DebitError, Result};
use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};

const NONCE_LEN: usize = 12;

/// AES-256-GCM cipher with a process-wide key.
///
/// Ciphertexts are `base64(nonce || sealed)`, so every call to `encrypt`
/// yields a different value for the same plaintext.
pub struct AesGcmCipher {
    cipher: Aes256Gcm,
}

impl AesGcmCipher {
    pub fn new(key: &[u8; 32]) -> Self {
        let key = Key::<Aes256Gcm>::from_slice(key);
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }
}

impl Cipher for AesGcmCipher {
    fn encrypt(&self, plaintext: &str) -> Result<EncryptedField> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let sealed = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| DebitError::Encryption(e.to_string()))?;

        let mut payload = Vec::with_capacity(NONCE_LEN + sealed.len());
        payload.extend_from_slice(&nonce);
        payload.extend_from_slice(&sealed);
        Ok(EncryptedField::new(BASE64.encode(payload)))
    }

    fn decrypt(&self, ciphertext: &EncryptedField) -> Result<String> {
        let payload = BASE64
            .decode(ciphertext.as_str())
            .map_err(|e| DebitError::Decryption(e.to_string()))?;
        if payload.len() <= NONCE_LEN {
            return Err(DebitError::Decryption("ciphertext too short".to_string()));
        }

        let (nonce, sealed) = payload.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|e| DebitError::Decryption(e.to_string()))?;
        String::from_utf8(plaintext).map_err(|e| DebitError::Decryption(e.to_string()))
    }
}
