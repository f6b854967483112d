//! Randomness source used for key and nonce generation.

use aes_gcm::aead::{rand_core::RngCore, OsRng};
use thiserror::Error;

/// The randomness source could not produce bytes.
#[derive(Debug, Error)]
#[error("randomness source unavailable: {0}")]
pub struct EntropyError(pub String);

/// Fills buffers with cryptographically secure random bytes.
#[cfg_attr(test, mockall::automock)]
pub trait EntropySource {
    /// Fill `dest` entirely, or fail without a partial result being used.
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), EntropyError>;
}

/// The operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), EntropyError> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| EntropyError(e.to_string()))
    }
}
