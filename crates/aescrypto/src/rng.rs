//! Source of IVs and nonces.
//!
//! Every encryption call draws fresh bytes from a [`RandomSource`]. The public
//! entry points always use [`OsRandom`]; the trait exists so tests can pin the
//! IV to check known-answer vectors.

use aes_gcm::aead::{rand_core::RngCore, OsRng};

use crate::error::CryptoError;

/// Fills buffers with cryptographically secure random bytes.
///
/// Implementations must never fall back to a non-cryptographic generator: a
/// repeated GCM nonce under one key voids authentication entirely.
#[cfg_attr(test, mockall::automock)]
pub trait RandomSource {
    /// Fill `dest` completely or fail.
    fn fill(&self, dest: &mut [u8]) -> Result<(), CryptoError>;
}

/// The operating system CSPRNG. Stateless, so it is safe to use from any
/// number of threads at once.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&self, dest: &mut [u8]) -> Result<(), CryptoError> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|_| CryptoError::RandomSource)
    }
}
