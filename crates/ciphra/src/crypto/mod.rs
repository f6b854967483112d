//! AES-256-GCM primitives, key record encoding, and the randomness seam.
//!
//! This module is free of session state and HTTP dependencies.
//!
//! # Formats
//!
//! - Messages: `{"ciphertext": <base64>, "iv": [12 integers]}` (see [`cipher`]).
//! - Keys: JSON Web Key, `kty: "oct"`, `alg: "A256GCM"` (see [`jwk`]).

pub mod cipher;
pub mod entropy;
pub mod jwk;

pub use cipher::{EncryptedMessage, KEY_LEN, NONCE_LEN};
pub use entropy::{EntropySource, OsEntropy};
pub use jwk::KeyMaterialRecord;
