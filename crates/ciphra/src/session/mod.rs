//! Encryption Session: the live AES-256-GCM key and the encrypt/decrypt demo.
//!
//! # Lifecycle
//!
//! A session starts [`SessionState::Uninitialized`]. [`EncryptionSession::generate_key`]
//! and [`EncryptionSession::import_key`] move it to [`SessionState::Ready`]; both may be
//! called again at any time and the newest key wins.
//!
//! # Invariants
//!
//! - A key handle is only installed after it is fully generated or validated.
//! - Every encryption draws a fresh random 96-bit nonce.
//! - Failed operations leave the key and the last outputs untouched.
//! - Authentication failures are reported as one opaque error.
//! - Key material, plaintext, and ciphertext never reach a log field.

pub mod store;

pub use store::KeyHandle;

use thiserror::Error;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::crypto::cipher::{decrypt_message, encrypt_message, CipherError};
use crate::crypto::entropy::{EntropySource, OsEntropy};
use crate::crypto::jwk::JwkError;
use crate::crypto::{EncryptedMessage, KeyMaterialRecord, KEY_LEN, NONCE_LEN};

/// Errors produced by an [`EncryptionSession`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// The randomness source failed while generating a key. Not retried.
    #[error("key generation failed: randomness source unavailable")]
    KeyGenerationFailed,

    /// No nonce could be drawn, or the AEAD rejected the input.
    #[error("encryption failed")]
    EncryptionFailed,

    #[error("no key available")]
    NoKeyAvailable,

    #[error("malformed key record: {0}")]
    MalformedKeyRecord(&'static str),

    #[error("unsupported key algorithm: {0}")]
    UnsupportedKeyAlgorithm(String),

    #[error("no plaintext provided")]
    EmptyPlaintext,

    #[error("ciphertext input must be JSON with base64 `ciphertext` and a 12-byte `iv`")]
    MalformedCiphertextInput,

    #[error("decryption failed: message could not be authenticated")]
    AuthenticationFailed,
}

impl From<JwkError> for SessionError {
    fn from(e: JwkError) -> Self {
        match e {
            JwkError::Malformed(reason) => SessionError::MalformedKeyRecord(reason),
            JwkError::Unsupported(alg) => SessionError::UnsupportedKeyAlgorithm(alg),
        }
    }
}

/// Where the session is in its key lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Ready,
}

/// Result of the most recent successful encryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionOutput {
    /// Base64 ciphertext for display.
    pub ciphertext: String,
    /// Serialized `{ciphertext, iv}` record.
    pub record: String,
}

/// Owns one symmetric key and performs authenticated encryption with it.
///
/// Operations are sequential (`&mut self`); wrap in a lock to share.
#[derive(Debug)]
pub struct EncryptionSession<E = OsEntropy> {
    entropy: E,
    key: Option<KeyHandle>,
    last_encryption: Option<EncryptionOutput>,
    last_decryption: Option<String>,
}

impl EncryptionSession<OsEntropy> {
    /// An uninitialised session backed by the OS CSPRNG.
    pub fn new() -> Self {
        Self::with_entropy(OsEntropy)
    }
}

impl Default for EncryptionSession<OsEntropy> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntropySource> EncryptionSession<E> {
    /// An uninitialised session drawing randomness from `entropy`.
    pub fn with_entropy(entropy: E) -> Self {
        Self {
            entropy,
            key: None,
            last_encryption: None,
            last_decryption: None,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.key.is_some() {
            SessionState::Ready
        } else {
            SessionState::Uninitialized
        }
    }

    /// The currently held key, if any.
    pub fn key(&self) -> Option<&KeyHandle> {
        self.key.as_ref()
    }

    /// Output of the last successful [`Self::encrypt`].
    pub fn last_encryption(&self) -> Option<&EncryptionOutput> {
        self.last_encryption.as_ref()
    }

    /// Plaintext recovered by the last successful [`Self::decrypt`].
    pub fn last_decryption(&self) -> Option<&str> {
        self.last_decryption.as_deref()
    }

    /// Generate a fresh 256-bit key, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::KeyGenerationFailed`] if the randomness source
    /// fails. The previous key, if any, is retained.
    pub fn generate_key(&mut self) -> Result<KeyHandle, SessionError> {
        let mut bytes = Zeroizing::new([0u8; KEY_LEN]);
        if let Err(e) = self.entropy.fill(&mut *bytes) {
            warn!(error = %e, "key generation failed");
            return Err(SessionError::KeyGenerationFailed);
        }
        let handle = KeyHandle::new(&bytes);
        self.key = Some(handle.clone());
        info!("new AES-256-GCM key generated");
        Ok(handle)
    }

    /// Export the held key as a [`KeyMaterialRecord`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoKeyAvailable`] if no key is held.
    pub fn export_key(&self) -> Result<KeyMaterialRecord, SessionError> {
        let key = self.key.as_ref().ok_or(SessionError::NoKeyAvailable)?;
        info!("key exported");
        Ok(key.to_record())
    }

    /// Parse a JSON key record and install it, replacing any existing key.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MalformedKeyRecord`] if `text` is not a usable
    /// JSON Web Key, or [`SessionError::UnsupportedKeyAlgorithm`] if it names a
    /// key type or algorithm other than AES-256-GCM.
    pub fn import_key(&mut self, text: &str) -> Result<KeyHandle, SessionError> {
        let record = KeyMaterialRecord::parse(text)?;
        self.import_record(&record)
    }

    /// Install an already-parsed key record. See [`Self::import_key`].
    pub fn import_record(&mut self, record: &KeyMaterialRecord) -> Result<KeyHandle, SessionError> {
        let bytes = record.key_bytes().map_err(|e| {
            warn!(error = %e, "key import rejected");
            SessionError::from(e)
        })?;
        let handle = KeyHandle::new(&bytes);
        self.key = Some(handle.clone());
        info!("AES-256-GCM key imported");
        Ok(handle)
    }

    /// Encrypt the trimmed `plaintext` under the held key with a fresh nonce.
    ///
    /// On success the last encryption output is replaced wholesale.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyPlaintext`] if `plaintext` is blank,
    /// [`SessionError::NoKeyAvailable`] if no key is held, or
    /// [`SessionError::EncryptionFailed`] if no nonce could be drawn.
    pub fn encrypt(&mut self, plaintext: &str) -> Result<EncryptedMessage, SessionError> {
        let plaintext = plaintext.trim();
        if plaintext.is_empty() {
            return Err(SessionError::EmptyPlaintext);
        }
        let key = self.key.as_ref().ok_or(SessionError::NoKeyAvailable)?;

        let mut nonce = [0u8; NONCE_LEN];
        if let Err(e) = self.entropy.fill(&mut nonce) {
            warn!(error = %e, "nonce generation failed");
            return Err(SessionError::EncryptionFailed);
        }

        let message = encrypt_message(plaintext.as_bytes(), key.bytes(), nonce).map_err(|e| {
            warn!(error = %e, "encryption failed");
            SessionError::EncryptionFailed
        })?;

        let record = message.to_wire_json().map_err(|e| {
            warn!(error = %e, "ciphertext record serialisation failed");
            SessionError::EncryptionFailed
        })?;
        self.last_encryption = Some(EncryptionOutput {
            ciphertext: message.ciphertext_base64(),
            record,
        });
        debug!(bytes = plaintext.len(), "encryption successful");
        Ok(message)
    }

    /// Parse a serialized `{ciphertext, iv}` record and decrypt it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MalformedCiphertextInput`] if `wire` cannot be
    /// parsed; otherwise as [`Self::decrypt`].
    pub fn decrypt_wire(&mut self, wire: &str) -> Result<String, SessionError> {
        let message = EncryptedMessage::from_wire_json(wire)
            .map_err(|_| SessionError::MalformedCiphertextInput)?;
        self.decrypt(&message)
    }

    /// Decrypt `message` under the held key.
    ///
    /// On success the last decrypted text is replaced wholesale.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoKeyAvailable`] if no key is held, or
    /// [`SessionError::AuthenticationFailed`] if the key, nonce, and
    /// ciphertext do not authenticate together.
    pub fn decrypt(&mut self, message: &EncryptedMessage) -> Result<String, SessionError> {
        let key = self.key.as_ref().ok_or(SessionError::NoKeyAvailable)?;
        let plaintext = decrypt_message(message, key.bytes()).map_err(|e| {
            if !matches!(e, CipherError::AeadFailure) {
                warn!(error = %e, "decryption failed");
            }
            SessionError::AuthenticationFailed
        })?;
        let text = String::from_utf8_lossy(&plaintext).into_owned();
        self.last_decryption = Some(text.clone());
        debug!(bytes = plaintext.len(), "decryption successful");
        Ok(text)
    }
}
