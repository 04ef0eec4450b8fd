//! PKCS#7 padding over an arbitrary block size.
//!
//! The pad byte encodes the pad length, so block sizes are limited to
//! `1..=255`.

use std::str::FromStr;

use crate::error::CryptoError;

/// Largest block size a single PKCS#7 pad byte can describe.
pub const MAX_BLOCK_LEN: usize = u8::MAX as usize;

/// Padding applied to CBC plaintext before encryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaddingScheme {
    /// The caller guarantees block-aligned plaintext; nothing is added or stripped.
    None,
    /// PKCS#7 padding (always adds 1..=block size bytes).
    #[default]
    Pkcs7,
}

impl PaddingScheme {
    /// Pad `data` for encryption under this scheme.
    pub(crate) fn apply(self, data: &[u8], block_size: usize) -> Result<Vec<u8>, CryptoError> {
        match self {
            PaddingScheme::Pkcs7 => pad(data, block_size),
            PaddingScheme::None => {
                if block_size == 0 {
                    return Err(CryptoError::InvalidBlockLength(block_size));
                }
                if data.len() % block_size != 0 {
                    return Err(CryptoError::InvalidDataLength(data.len()));
                }
                Ok(data.to_vec())
            }
        }
    }

    /// Strip padding from decrypted `data` under this scheme.
    pub(crate) fn strip(self, data: &[u8], block_size: usize) -> Result<Vec<u8>, CryptoError> {
        match self {
            PaddingScheme::Pkcs7 => unpad(data, block_size).map(<[u8]>::to_vec),
            PaddingScheme::None => Ok(data.to_vec()),
        }
    }
}

impl FromStr for PaddingScheme {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("pkcs7") {
            Ok(PaddingScheme::Pkcs7)
        } else if s.eq_ignore_ascii_case("none") {
            Ok(PaddingScheme::None)
        } else {
            Err(CryptoError::UnknownPadding(s.to_owned()))
        }
    }
}

fn check_block_size(block_size: usize) -> Result<(), CryptoError> {
    if block_size == 0 || block_size > MAX_BLOCK_LEN {
        return Err(CryptoError::InvalidBlockLength(block_size));
    }
    Ok(())
}

/// Append PKCS#7 padding so the result is the smallest multiple of
/// `block_size` strictly longer than `data`.
///
/// Block-aligned input still receives a full block of padding.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidBlockLength`] if `block_size` is 0 or above
/// [`MAX_BLOCK_LEN`].
pub fn pad(data: &[u8], block_size: usize) -> Result<Vec<u8>, CryptoError> {
    check_block_size(block_size)?;
    let pad_len = block_size - data.len() % block_size;

    let mut out = Vec::with_capacity(data.len() + pad_len);
    out.extend_from_slice(data);
    // pad_len <= MAX_BLOCK_LEN, checked above.
    out.resize(data.len() + pad_len, pad_len as u8);
    Ok(out)
}

/// Validate and remove PKCS#7 padding, returning the original data.
///
/// Every one of the trailing pad bytes must equal the pad length; anything
/// else is rejected as [`CryptoError::InvalidPadding`].
///
/// # Errors
///
/// - [`CryptoError::InvalidBlockLength`] for an unusable `block_size`.
/// - [`CryptoError::InvalidDataLength`] if `data` is empty or not a multiple of
///   `block_size`.
/// - [`CryptoError::InvalidPadding`] if the padding is not canonical.
pub fn unpad(data: &[u8], block_size: usize) -> Result<&[u8], CryptoError> {
    check_block_size(block_size)?;
    if data.is_empty() || data.len() % block_size != 0 {
        return Err(CryptoError::InvalidDataLength(data.len()));
    }

    let pad_len = usize::from(data[data.len() - 1]);
    if pad_len == 0 || pad_len > block_size {
        return Err(CryptoError::InvalidPadding);
    }

    let (body, padding) = data.split_at(data.len() - pad_len);
    if padding.iter().any(|&b| usize::from(b) != pad_len) {
        return Err(CryptoError::InvalidPadding);
    }
    Ok(body)
}
