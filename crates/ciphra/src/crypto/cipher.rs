//! AES-256-GCM encryption and decryption of text messages.
//!
//! **Nonces are caller-supplied and must be fresh per message.** GCM nonce
//! reuse under one key breaks both confidentiality and authentication.
//!
//! # Wire form
//!
//! ```text
//! {"ciphertext":"<base64(ciphertext+tag)>","iv":[12 integers 0-255]}
//! ```

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the GCM authentication tag appended to the ciphertext.
pub const TAG_LEN: usize = 16;

/// An encrypted message: ciphertext with appended tag, and the nonce used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedMessage {
    /// Raw ciphertext + authentication tag bytes.
    pub ciphertext: Vec<u8>,
    /// Raw nonce bytes.
    pub nonce: [u8; NONCE_LEN],
}

#[derive(Serialize, Deserialize)]
struct WireMessage {
    ciphertext: String,
    iv: [u8; NONCE_LEN],
}

impl EncryptedMessage {
    /// Base64 of the ciphertext, as shown to the user.
    pub fn ciphertext_base64(&self) -> String {
        STANDARD.encode(&self.ciphertext)
    }

    /// Encode this message to its JSON wire form.
    pub fn to_wire_json(&self) -> Result<String, serde_json::Error> {
        let wire = WireMessage {
            ciphertext: self.ciphertext_base64(),
            iv: self.nonce,
        };
        serde_json::to_string(&wire)
    }

    /// Parse the JSON wire form. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidFormat`] if the text is not JSON, lacks
    /// either field, `iv` is not exactly 12 integers in `0..=255`, or
    /// `ciphertext` is not valid base64.
    pub fn from_wire_json(s: &str) -> Result<Self, CipherError> {
        let wire: WireMessage =
            serde_json::from_str(s.trim()).map_err(|_| CipherError::InvalidFormat)?;
        let ciphertext = STANDARD
            .decode(wire.ciphertext.trim())
            .map_err(|_| CipherError::InvalidFormat)?;
        Ok(Self {
            ciphertext,
            nonce: wire.iv,
        })
    }
}

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The key is the wrong length (must be [`KEY_LEN`] bytes).
    #[error("invalid key length: expected {KEY_LEN} bytes")]
    InvalidKeyLength,

    /// AES-GCM encryption or decryption failed.
    #[error("aead operation failed")]
    AeadFailure,

    /// The encrypted message does not match the expected wire format.
    #[error("invalid encrypted message format")]
    InvalidFormat,
}

/// Encrypt `plaintext` under `key` with the given `nonce`.
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyLength`] if `key` is not [`KEY_LEN`] bytes.
/// Returns [`CipherError::AeadFailure`] on an internal AEAD error (should be unreachable
/// with a valid key and nonce).
pub fn encrypt_message(
    plaintext: &[u8],
    key: &[u8],
    nonce: [u8; NONCE_LEN],
) -> Result<EncryptedMessage, CipherError> {
    let cipher = build_cipher(key)?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| CipherError::AeadFailure)?;
    Ok(EncryptedMessage { ciphertext, nonce })
}

/// Decrypt an [`EncryptedMessage`] back to plaintext bytes.
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyLength`] if `key` is not [`KEY_LEN`] bytes.
/// Returns [`CipherError::AeadFailure`] if authentication fails (wrong key, wrong
/// nonce, or tampered data).
pub fn decrypt_message(message: &EncryptedMessage, key: &[u8]) -> Result<Vec<u8>, CipherError> {
    let cipher = build_cipher(key)?;
    cipher
        .decrypt(Nonce::from_slice(&message.nonce), message.ciphertext.as_ref())
        .map_err(|_| CipherError::AeadFailure)
}

fn build_cipher(key: &[u8]) -> Result<Aes256Gcm, CipherError> {
    if key.len() != KEY_LEN {
        return Err(CipherError::InvalidKeyLength);
    }
    Aes256Gcm::new_from_slice(key).map_err(|_| CipherError::InvalidKeyLength)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::entropy::{EntropySource, OsEntropy};

    fn random_key() -> Vec<u8> {
        let mut key = vec![0u8; KEY_LEN];
        OsEntropy.fill(&mut key).unwrap();
        key
    }

    fn random_nonce() -> [u8; NONCE_LEN] {
        let mut nonce = [0u8; NONCE_LEN];
        OsEntropy.fill(&mut nonce).unwrap();
        nonce
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let key = random_key();
        let encrypted = encrypt_message(b"attack at dawn", &key, random_nonce()).unwrap();
        assert_eq!(encrypted.ciphertext.len(), 14 + TAG_LEN);
        let decrypted = decrypt_message(&encrypted, &key).unwrap();
        assert_eq!(decrypted, b"attack at dawn");
    }

    #[test]
    fn wrong_key_fails_decryption() {
        let encrypted = encrypt_message(b"secret", &random_key(), random_nonce()).unwrap();
        assert!(matches!(
            decrypt_message(&encrypted, &random_key()),
            Err(CipherError::AeadFailure)
        ));
    }

    #[test]
    fn invalid_key_length_rejected() {
        let short_key = vec![0u8; 16];
        assert!(matches!(
            encrypt_message(b"x", &short_key, [0u8; NONCE_LEN]),
            Err(CipherError::InvalidKeyLength)
        ));
    }

    #[test]
    fn wire_round_trip() {
        let key = random_key();
        let msg = encrypt_message(b"hello", &key, random_nonce()).unwrap();
        let wire = msg.to_wire_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&wire).unwrap();
        assert_eq!(value["iv"].as_array().unwrap().len(), NONCE_LEN);
        assert!(value["ciphertext"].is_string());
        let parsed = EncryptedMessage::from_wire_json(&format!("  {wire}\n")).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn wire_rejects_short_iv() {
        let s = r#"{"ciphertext":"AAAA","iv":[1,2,3]}"#;
        assert!(EncryptedMessage::from_wire_json(s).is_err());
    }

    #[test]
    fn wire_rejects_out_of_range_iv() {
        let s = r#"{"ciphertext":"AAAA","iv":[1,2,3,4,5,6,7,8,9,10,11,256]}"#;
        assert!(EncryptedMessage::from_wire_json(s).is_err());
    }

    #[test]
    fn wire_rejects_bad_base64() {
        let s = r#"{"ciphertext":"!!!","iv":[0,0,0,0,0,0,0,0,0,0,0,0]}"#;
        assert!(EncryptedMessage::from_wire_json(s).is_err());
    }

    #[test]
    fn wire_rejects_non_json() {
        assert!(EncryptedMessage::from_wire_json("v1.abc.def").is_err());
        assert!(EncryptedMessage::from_wire_json("").is_err());
    }

    #[test]
    fn tampered_ciphertext_fails_auth() {
        let key = random_key();
        let mut msg = encrypt_message(b"tamper me", &key, random_nonce()).unwrap();
        // Flip a byte in the ciphertext to simulate tampering.
        msg.ciphertext[0] ^= 0xFF;
        assert!(decrypt_message(&msg, &key).is_err());
    }

    #[test]
    fn truncated_ciphertext_fails_auth() {
        let key = random_key();
        let mut msg = encrypt_message(b"short", &key, random_nonce()).unwrap();
        msg.ciphertext.truncate(TAG_LEN - 1);
        assert!(matches!(
            decrypt_message(&msg, &key),
            Err(CipherError::AeadFailure)
        ));
    }
}
