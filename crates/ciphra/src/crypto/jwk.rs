//! JSON Web Key encoding of the session's symmetric key.
//!
//! Exported records match what a browser's `SubtleCrypto.exportKey("jwk", ...)`
//! produces for an extractable AES-256-GCM key, so keys move freely between
//! this service and a web client.

use base64::{
    alphabet,
    engine::{
        general_purpose::URL_SAFE_NO_PAD, DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig,
    },
    Engine as _,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

use super::cipher::KEY_LEN;

/// File name offered when a key record is downloaded.
pub const KEY_FILE_NAME: &str = "aes-key.json";

/// JWK `kty` for symmetric keys.
pub const KTY_OCT: &str = "oct";

/// JWK `alg` for AES-256-GCM.
pub const ALG_A256GCM: &str = "A256GCM";

const OP_ENCRYPT: &str = "encrypt";
const OP_DECRYPT: &str = "decrypt";

/// Lenient decoder: browsers never pad, hand-edited files sometimes do.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Portable key-material record in JSON Web Key shape.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMaterialRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<bool>,
    pub k: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_ops: Option<Vec<String>>,
    pub kty: String,
}

impl std::fmt::Debug for KeyMaterialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterialRecord")
            .field("alg", &self.alg)
            .field("ext", &self.ext)
            .field("k", &"[REDACTED]")
            .field("key_ops", &self.key_ops)
            .field("kty", &self.kty)
            .finish()
    }
}

/// Errors produced while decoding a [`KeyMaterialRecord`].
#[derive(Debug, Error)]
pub enum JwkError {
    /// Not JSON, or a required field is missing or unusable.
    #[error("malformed key record: {0}")]
    Malformed(&'static str),

    /// The record names a key type or algorithm other than AES-256-GCM.
    #[error("unsupported key algorithm: {0}")]
    Unsupported(String),
}

impl KeyMaterialRecord {
    /// Build the record for raw AES-256-GCM key bytes.
    pub fn from_key_bytes(key: &[u8; KEY_LEN]) -> Self {
        Self {
            alg: Some(ALG_A256GCM.to_owned()),
            ext: Some(true),
            k: URL_SAFE_NO_PAD.encode(key),
            key_ops: Some(vec![OP_ENCRYPT.to_owned(), OP_DECRYPT.to_owned()]),
            kty: KTY_OCT.to_owned(),
        }
    }

    /// Pretty-printed JSON with two-space indentation.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a record from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`JwkError::Malformed`] if the text is not a JSON object with
    /// string `kty` and `k` fields.
    pub fn parse(text: &str) -> Result<Self, JwkError> {
        serde_json::from_str(text.trim())
            .map_err(|_| JwkError::Malformed("expected a JSON Web Key object"))
    }

    /// Validate the record and return the raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`JwkError::Unsupported`] for a `kty` other than `oct` or an
    /// `alg` other than `A256GCM`. Returns [`JwkError::Malformed`] if `k` does
    /// not decode to exactly [`KEY_LEN`] bytes or `key_ops` lacks
    /// `encrypt`/`decrypt`.
    ///
    /// The returned buffer is wiped when dropped.
    pub fn key_bytes(&self) -> Result<Zeroizing<[u8; KEY_LEN]>, JwkError> {
        if self.kty != KTY_OCT {
            return Err(JwkError::Unsupported(format!("kty {}", self.kty)));
        }
        if let Some(alg) = &self.alg {
            if alg != ALG_A256GCM {
                return Err(JwkError::Unsupported(alg.clone()));
            }
        }
        if let Some(ops) = &self.key_ops {
            let has = |op: &str| ops.iter().any(|o| o == op);
            if !has(OP_ENCRYPT) || !has(OP_DECRYPT) {
                return Err(JwkError::Malformed("key_ops must allow encrypt and decrypt"));
            }
        }
        let raw = Zeroizing::new(
            URL_SAFE_LENIENT
                .decode(self.k.trim())
                .map_err(|_| JwkError::Malformed("k is not base64url"))?,
        );
        if raw.len() != KEY_LEN {
            return Err(JwkError::Malformed("k must encode a 256-bit key"));
        }
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        key.copy_from_slice(&raw);
        Ok(key)
    }
}
