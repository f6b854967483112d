//! Static algorithm catalogs: cipher, key exchange, and authentication.
//!
//! Entries are immutable and identical for every session. Listing order is the
//! order in which the entries are declared.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three independent catalogs a suite draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Cipher,
    KeyExchange,
    Authentication,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 3] = [
        Category::Cipher,
        Category::KeyExchange,
        Category::Authentication,
    ];

    /// The catalog backing this category.
    pub fn entries(self) -> &'static [CatalogEntry] {
        match self {
            Category::Cipher => CIPHERS,
            Category::KeyExchange => KEY_EXCHANGES,
            Category::Authentication => AUTHENTICATIONS,
        }
    }

    /// Look up `id` in this category's catalog.
    pub fn lookup(self, id: &str) -> Option<&'static CatalogEntry> {
        self.entries().iter().find(|e| e.id == id)
    }

    /// Parse a category from its path segment (`cipher`, `keyExchange`, `key-exchange`, ...).
    pub fn from_segment(s: &str) -> Option<Self> {
        match s {
            "cipher" => Some(Category::Cipher),
            "keyExchange" | "key-exchange" | "key_exchange" | "kex" => Some(Category::KeyExchange),
            "authentication" | "auth" => Some(Category::Authentication),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::Cipher => "cipher",
            Category::KeyExchange => "key exchange",
            Category::Authentication => "authentication",
        })
    }
}

/// A named algorithm with its strength rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub display_name: &'static str,
    /// Strength score in `0..=100`.
    pub strength: u8,
    /// Forward secrecy flag. Absent for authentication algorithms.
    pub forward_secrecy: Option<bool>,
}

const fn entry(
    id: &'static str,
    display_name: &'static str,
    strength: u8,
    forward_secrecy: Option<bool>,
) -> CatalogEntry {
    CatalogEntry {
        id,
        display_name,
        strength,
        forward_secrecy,
    }
}

pub static CIPHERS: &[CatalogEntry] = &[
    entry("aes-256-gcm", "AES-256-GCM", 95, Some(true)),
    entry("chacha20-poly1305", "ChaCha20-Poly1305", 95, Some(true)),
    entry("aes-128-gcm", "AES-128-GCM", 85, Some(true)),
    entry("aes-256-cbc", "AES-256-CBC", 80, Some(true)),
];

pub static KEY_EXCHANGES: &[CatalogEntry] = &[
    entry("ecdhe-x25519", "ECDHE-X25519", 95, Some(true)),
    entry("ecdhe-p256", "ECDHE-P256", 90, Some(true)),
    entry("dhe-2048", "DHE-2048", 80, Some(true)),
    entry("rsa-2048", "RSA-2048", 60, Some(false)),
];

pub static AUTHENTICATIONS: &[CatalogEntry] = &[
    entry("ecdsa-p256", "ECDSA-P256", 95, None),
    entry("rsa-pss-2048", "RSA-PSS-2048", 85, None),
    entry("ed25519", "Ed25519", 98, None),
    entry("rsa-pkcs1-2048", "RSA-PKCS1-2048", 75, None),
];

/// Recommended suite used to pre-populate new selections.
pub const RECOMMENDED_CIPHER: &str = "aes-256-gcm";
pub const RECOMMENDED_KEY_EXCHANGE: &str = "ecdhe-x25519";
pub const RECOMMENDED_AUTHENTICATION: &str = "ecdsa-p256";
