//! [`KeyHandle`]: shared, opaque reference to a session's symmetric key.

use std::sync::Arc;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::{KeyMaterialRecord, KEY_LEN};

/// Fixed-size key buffer that holds exactly [`KEY_LEN`] bytes.
///
/// When this type is dropped, the memory is overwritten with zeroes to
/// minimise the window during which plaintext key material lives in RAM.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct KeyBytes(Box<[u8; KEY_LEN]>);

impl KeyBytes {
    pub fn new(bytes: &[u8; KEY_LEN]) -> Self {
        Self(Box::new(*bytes))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for KeyBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material — not even in debug builds.
        f.write_str("KeyBytes([REDACTED])")
    }
}

/// Opaque handle to an AES-256-GCM key usable for both encrypt and decrypt.
///
/// Cloning shares the same key. The key is zeroed once the last handle drops,
/// so replacing a session's handle is all it takes to retire the old key.
#[derive(Clone, Debug)]
pub struct KeyHandle {
    inner: Arc<KeyBytes>,
}

impl KeyHandle {
    pub(crate) fn new(bytes: &[u8; KEY_LEN]) -> Self {
        Self {
            inner: Arc::new(KeyBytes::new(bytes)),
        }
    }

    pub(crate) fn bytes(&self) -> &[u8; KEY_LEN] {
        self.inner.as_bytes()
    }

    /// Encode the key as a portable JSON Web Key record.
    pub fn to_record(&self) -> KeyMaterialRecord {
        KeyMaterialRecord::from_key_bytes(self.bytes())
    }

    /// `true` if both handles refer to the same key material.
    pub fn same_key(&self, other: &KeyHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.bytes() == other.bytes()
    }
}
