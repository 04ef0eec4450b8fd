//! Packed ciphertext wire format.
//!
//! # Layout (before base64)
//!
//! ```text
//! CBC: iv(16) || ciphertext
//! GCM: nonce_len(1) || tag_len(1) || nonce(nonce_len) || ciphertext || tag
//! ```
//!
//! The packed bytes are transported as standard, padded base64. CBC carries no
//! length field because its IV length is fixed; GCM records both AEAD sizes so
//! decoders written in other languages can rebuild matching parameters.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::CryptoError;

/// Byte length of a CBC initialisation vector (one AES block).
pub const IV_LEN: usize = 16;

/// Byte length of the GCM size header.
pub const GCM_HEADER_LEN: usize = 2;

/// A CBC blob split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CbcEnvelope {
    /// Random IV drawn for this message.
    pub iv: [u8; IV_LEN],
    /// Padded ciphertext.
    pub ciphertext: Vec<u8>,
}

impl CbcEnvelope {
    /// Serialise to `iv || ciphertext`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(IV_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.iv);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Split packed bytes into IV and ciphertext.
    ///
    /// Block alignment of the ciphertext is checked by the CBC path, not here.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidDataLength`] if `data` is shorter than an IV.
    pub fn from_bytes(data: &[u8]) -> Result<Self, CryptoError> {
        if data.len() < IV_LEN {
            return Err(CryptoError::InvalidDataLength(data.len()));
        }
        let (iv_bytes, ciphertext) = data.split_at(IV_LEN);
        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(iv_bytes);
        Ok(Self {
            iv,
            ciphertext: ciphertext.to_vec(),
        })
    }

    /// Base64-encode the packed form.
    pub fn encode(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Parse a base64 blob.
    ///
    /// # Errors
    ///
    /// [`CryptoError::InvalidEncoding`] for bad base64, otherwise as
    /// [`CbcEnvelope::from_bytes`].
    pub fn decode(blob: &str) -> Result<Self, CryptoError> {
        Self::from_bytes(&STANDARD.decode(blob)?)
    }
}

/// A GCM blob split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcmEnvelope {
    /// Nonce exactly as the producer generated it.
    pub nonce: Vec<u8>,
    /// Tag size announced by the producer (header byte 1).
    pub tag_len: u8,
    /// Ciphertext with the tag appended.
    pub ciphertext: Vec<u8>,
}

impl GcmEnvelope {
    /// Serialise to `nonce_len || tag_len || nonce || ciphertext`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::UnsupportedNonceLength`] if the nonce does not
    /// fit the one-byte length field.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CryptoError> {
        let nonce_len = u8::try_from(self.nonce.len())
            .map_err(|_| CryptoError::UnsupportedNonceLength(self.nonce.len()))?;

        let mut out =
            Vec::with_capacity(GCM_HEADER_LEN + self.nonce.len() + self.ciphertext.len());
        out.push(nonce_len);
        out.push(self.tag_len);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        Ok(out)
    }

    /// Split packed bytes using the sizes recorded in the header.
    ///
    /// The header is not covered by the tag, so a header whose sizes overrun
    /// the data is treated like any other unauthenticated input.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::InvalidDataLength`] if `data` is shorter than the
    ///   two-byte header.
    /// - [`CryptoError::AuthenticationFailure`] if the remaining bytes cannot
    ///   hold the announced nonce and tag.
    pub fn from_bytes(data: &[u8]) -> Result<Self, CryptoError> {
        let [nonce_len, tag_len, rest @ ..] = data else {
            return Err(CryptoError::InvalidDataLength(data.len()));
        };
        let nonce_len = usize::from(*nonce_len);
        if rest.len() < nonce_len + usize::from(*tag_len) {
            return Err(CryptoError::AuthenticationFailure);
        }
        let (nonce, ciphertext) = rest.split_at(nonce_len);
        Ok(Self {
            nonce: nonce.to_vec(),
            tag_len: *tag_len,
            ciphertext: ciphertext.to_vec(),
        })
    }

    /// Base64-encode the packed form.
    ///
    /// # Errors
    ///
    /// As [`GcmEnvelope::to_bytes`].
    pub fn encode(&self) -> Result<String, CryptoError> {
        Ok(STANDARD.encode(self.to_bytes()?))
    }

    /// Parse a base64 blob.
    ///
    /// # Errors
    ///
    /// [`CryptoError::InvalidEncoding`] for bad base64, otherwise as
    /// [`GcmEnvelope::from_bytes`].
    pub fn decode(blob: &str) -> Result<Self, CryptoError> {
        Self::from_bytes(&STANDARD.decode(blob)?)
    }
}
