//! Passphrase convenience wrapper over the CBC path.
//!
//! The key is the first 24 bytes of `SHA-512(passphrase)`, giving AES-192.
//! This is **not** a key-derivation function: there is no salt and no work
//! factor, so equal passphrases always give equal keys and weak passphrases
//! are cheap to brute-force. Callers that manage real keys should use
//! [`crate::CipherSuite`] or the [`crate::cbc`] / [`crate::gcm`] paths directly.

use sha2::{Digest, Sha512};

use crate::cbc;
use crate::error::CryptoError;

/// Length of the derived key (AES-192).
pub const DERIVED_KEY_LEN: usize = 24;

/// Key derived from a passphrase. Zeroed when dropped.
pub struct DerivedKey([u8; DERIVED_KEY_LEN]);

impl DerivedKey {
    /// Hash `passphrase` with SHA-512 and keep the first 24 bytes.
    pub fn from_passphrase(passphrase: &str) -> Self {
        let digest = Sha512::digest(passphrase.as_bytes());
        let mut key = [0u8; DERIVED_KEY_LEN];
        key.copy_from_slice(&digest[..DERIVED_KEY_LEN]);
        Self(key)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Encrypt `plaintext` with AES-192-CBC under a passphrase-derived key.
///
/// # Errors
///
/// See [`cbc::encrypt`].
pub fn encrypt(plaintext: &[u8], passphrase: &str) -> Result<String, CryptoError> {
    let key = DerivedKey::from_passphrase(passphrase);
    cbc::encrypt(plaintext, key.as_bytes())
}

/// Decrypt a blob produced by [`encrypt`].
///
/// # Errors
///
/// See [`cbc::decrypt`]. A wrong passphrase usually shows up as
/// [`CryptoError::InvalidPadding`], but may also return garbage bytes.
pub fn decrypt(blob: &str, passphrase: &str) -> Result<Vec<u8>, CryptoError> {
    let key = DerivedKey::from_passphrase(passphrase);
    cbc::decrypt(blob, key.as_bytes())
}

/// [`decrypt`], returning the plaintext as UTF-8 text.
///
/// # Errors
///
/// As [`decrypt`], plus [`CryptoError::InvalidUtf8`].
pub fn decrypt_to_string(blob: &str, passphrase: &str) -> Result<String, CryptoError> {
    String::from_utf8(decrypt(blob, passphrase)?).map_err(|_| CryptoError::InvalidUtf8)
}
