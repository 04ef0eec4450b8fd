//! Error type shared by every cipher path.

use thiserror::Error;

/// Errors produced by the padding, cipher and wire-format layers.
///
/// All variants are deterministic functions of the input (apart from
/// [`CryptoError::RandomSource`]), so callers should surface them rather than
/// retry.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The key is not 16, 24 or 32 bytes long.
    #[error("invalid AES key length: expected 16, 24 or 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    /// The block size handed to the padding layer cannot be used for PKCS#7.
    #[error("invalid block length {0}")]
    InvalidBlockLength(usize),

    /// Ciphertext (or padded data) is empty, truncated or not block-aligned.
    #[error("invalid data length {0}")]
    InvalidDataLength(usize),

    /// PKCS#7 padding did not validate after decryption.
    #[error("invalid padding")]
    InvalidPadding,

    /// The encoded blob is not valid standard base64.
    #[error("invalid base64 encoding: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),

    /// The GCM tag did not verify: tampered data, wrong key, or a header that
    /// does not describe the construction used to open it.
    #[error("authentication failed")]
    AuthenticationFailure,

    /// A GCM nonce length this crate cannot build an AEAD for.
    #[error("unsupported GCM nonce length {0}")]
    UnsupportedNonceLength(usize),

    /// The OS random number generator failed to produce an IV or nonce.
    #[error("secure random source unavailable")]
    RandomSource,

    /// Decrypted bytes were requested as text but are not UTF-8.
    #[error("decrypted data is not valid UTF-8")]
    InvalidUtf8,

    /// A cipher mode name that is neither `cbc` nor `gcm`.
    #[error("unknown cipher mode: {0}")]
    UnknownMode(String),

    /// A padding scheme name that is neither `pkcs7` nor `none`.
    #[error("unknown padding scheme: {0}")]
    UnknownPadding(String),
}
