//! AES-CBC with a random IV and PKCS#7 padding.
//!
//! **No integrity protection.** CBC ciphertext can be modified without the
//! decryptor noticing: a flipped bit only surfaces as
//! [`CryptoError::InvalidPadding`] when it happens to corrupt the final pad
//! bytes, and otherwise decrypts to different plaintext. Padding failures are
//! not a tamper check. Use the GCM path when authenticity matters.

use aes::{Aes128, Aes192, Aes256};
use cbc::cipher::{
    block_padding::NoPadding, BlockCipher, BlockDecryptMut, BlockEncryptMut, KeyInit, KeyIvInit,
};
use tracing::debug;

use crate::error::CryptoError;
use crate::padding::PaddingScheme;
use crate::rng::{OsRandom, RandomSource};
use crate::wire::{CbcEnvelope, IV_LEN};

/// AES block length in bytes.
pub const BLOCK_LEN: usize = 16;

/// Encrypt `plaintext` under `key` with a fresh IV and PKCS#7 padding.
///
/// Returns the base64 blob `iv || ciphertext`.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidKeyLength`] if `key` is not 16, 24 or 32
/// bytes, or [`CryptoError::RandomSource`] if no IV could be drawn.
pub fn encrypt(plaintext: &[u8], key: &[u8]) -> Result<String, CryptoError> {
    encrypt_with(&OsRandom, plaintext, key, PaddingScheme::Pkcs7)
}

/// Encrypt with an explicit padding scheme.
///
/// With [`PaddingScheme::None`] the plaintext must be block-aligned.
pub fn encrypt_padded(
    plaintext: &[u8],
    key: &[u8],
    padding: PaddingScheme,
) -> Result<String, CryptoError> {
    encrypt_with(&OsRandom, plaintext, key, padding)
}

/// Encrypt drawing the IV from `rng`.
pub fn encrypt_with<R>(
    rng: &R,
    plaintext: &[u8],
    key: &[u8],
    padding: PaddingScheme,
) -> Result<String, CryptoError>
where
    R: RandomSource + ?Sized,
{
    let mut iv = [0u8; IV_LEN];
    rng.fill(&mut iv)?;

    let mut buf = padding.apply(plaintext, BLOCK_LEN)?;
    match key.len() {
        16 => encrypt_blocks::<Aes128>(key, &iv, &mut buf)?,
        24 => encrypt_blocks::<Aes192>(key, &iv, &mut buf)?,
        32 => encrypt_blocks::<Aes256>(key, &iv, &mut buf)?,
        n => return Err(CryptoError::InvalidKeyLength(n)),
    }

    debug!(
        plaintext_len = plaintext.len(),
        ciphertext_len = buf.len(),
        "cbc encrypt"
    );
    Ok(CbcEnvelope {
        iv,
        ciphertext: buf,
    }
    .encode())
}

/// Decrypt a blob produced by [`encrypt`] and strip PKCS#7 padding.
///
/// # Errors
///
/// - [`CryptoError::InvalidEncoding`] if `blob` is not base64.
/// - [`CryptoError::InvalidDataLength`] if the ciphertext is truncated or not
///   block-aligned.
/// - [`CryptoError::InvalidKeyLength`] for an unsupported key size.
/// - [`CryptoError::InvalidPadding`] if padding does not validate (wrong key
///   or corrupted data, detected only some of the time).
pub fn decrypt(blob: &str, key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    decrypt_padded(blob, key, PaddingScheme::Pkcs7)
}

/// Decrypt a blob with an explicit padding scheme.
pub fn decrypt_padded(
    blob: &str,
    key: &[u8],
    padding: PaddingScheme,
) -> Result<Vec<u8>, CryptoError> {
    let CbcEnvelope { iv, mut ciphertext } = CbcEnvelope::decode(blob)?;
    if ciphertext.len() % BLOCK_LEN != 0 {
        return Err(CryptoError::InvalidDataLength(ciphertext.len()));
    }

    match key.len() {
        16 => decrypt_blocks::<Aes128>(key, &iv, &mut ciphertext)?,
        24 => decrypt_blocks::<Aes192>(key, &iv, &mut ciphertext)?,
        32 => decrypt_blocks::<Aes256>(key, &iv, &mut ciphertext)?,
        n => return Err(CryptoError::InvalidKeyLength(n)),
    }

    padding.strip(&ciphertext, BLOCK_LEN)
}

/// Encrypt block-aligned `buf` in place.
fn encrypt_blocks<C>(key: &[u8], iv: &[u8; IV_LEN], buf: &mut [u8]) -> Result<(), CryptoError>
where
    C: BlockCipher + BlockEncryptMut + KeyInit,
{
    let len = buf.len();
    cbc::Encryptor::<C>::new_from_slices(key, iv)
        .map_err(|_| CryptoError::InvalidKeyLength(key.len()))?
        .encrypt_padded_mut::<NoPadding>(buf, len)
        .map_err(|_| CryptoError::InvalidDataLength(len))?;
    Ok(())
}

/// Decrypt block-aligned `buf` in place.
fn decrypt_blocks<C>(key: &[u8], iv: &[u8; IV_LEN], buf: &mut [u8]) -> Result<(), CryptoError>
where
    C: BlockCipher + BlockDecryptMut + KeyInit,
{
    let len = buf.len();
    cbc::Decryptor::<C>::new_from_slices(key, iv)
        .map_err(|_| CryptoError::InvalidKeyLength(key.len()))?
        .decrypt_padded_mut::<NoPadding>(buf)
        .map_err(|_| CryptoError::InvalidDataLength(len))?;
    Ok(())
}
