//! [`CipherSuite`]: caller-selected cipher path.

use tracing::warn;

use crate::error::CryptoError;
use crate::gcm::Compatibility;
use crate::padding::PaddingScheme;
use crate::{cbc, gcm};

/// Cipher mode plus the settings only that mode needs.
///
/// The mode is never inferred from a blob; CBC output has no header at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherSuite {
    /// AES-CBC. Confidentiality only.
    Cbc(PaddingScheme),
    /// AES-GCM. The compatibility setting is consulted on decrypt.
    Gcm(Compatibility),
}

impl Default for CipherSuite {
    fn default() -> Self {
        CipherSuite::Cbc(PaddingScheme::Pkcs7)
    }
}

impl CipherSuite {
    /// Build a suite from configuration strings.
    ///
    /// `padding` is only read for CBC and `compatibility` only for GCM.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::UnknownMode`] or [`CryptoError::UnknownPadding`]
    /// for unrecognised names.
    pub fn parse(mode: &str, padding: &str, compatibility: &str) -> Result<Self, CryptoError> {
        if mode.eq_ignore_ascii_case("cbc") {
            Ok(CipherSuite::Cbc(padding.parse()?))
        } else if mode.eq_ignore_ascii_case("gcm") {
            Ok(CipherSuite::Gcm(Compatibility::from_tag(compatibility)))
        } else {
            Err(CryptoError::UnknownMode(mode.to_owned()))
        }
    }

    /// Short lowercase name of the mode, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            CipherSuite::Cbc(_) => "cbc",
            CipherSuite::Gcm(_) => "gcm",
        }
    }

    /// Encrypt `plaintext` under a raw AES key and return the base64 blob.
    ///
    /// # Errors
    ///
    /// See [`cbc::encrypt_padded`] and [`gcm::encrypt`].
    pub fn encrypt(&self, plaintext: &[u8], key: &[u8]) -> Result<String, CryptoError> {
        let result = match *self {
            CipherSuite::Cbc(padding) => cbc::encrypt_padded(plaintext, key, padding),
            CipherSuite::Gcm(_) => gcm::encrypt(plaintext, key),
        };
        result.inspect_err(|e| warn!(mode = self.name(), error = %e, "encryption failed"))
    }

    /// Decrypt a base64 blob under a raw AES key.
    ///
    /// # Errors
    ///
    /// See [`cbc::decrypt_padded`] and [`gcm::decrypt`].
    pub fn decrypt(&self, blob: &str, key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let result = match *self {
            CipherSuite::Cbc(padding) => cbc::decrypt_padded(blob, key, padding),
            CipherSuite::Gcm(compatibility) => gcm::decrypt(blob, key, compatibility),
        };
        result.inspect_err(|e| warn!(mode = self.name(), error = %e, "decryption failed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUITES: [CipherSuite; 4] = [
        CipherSuite::Cbc(PaddingScheme::Pkcs7),
        CipherSuite::Cbc(PaddingScheme::None),
        CipherSuite::Gcm(Compatibility::Native),
        CipherSuite::Gcm(Compatibility::Interop),
    ];

    #[test]
    fn every_suite_round_trips() {
        let key = [0x11u8; 32];
        let plaintext = [0xC3u8; 64];
        for suite in SUITES {
            let blob = suite.encrypt(&plaintext, &key).unwrap();
            assert_eq!(suite.decrypt(&blob, &key).unwrap(), plaintext, "{suite:?}");
        }
    }

    #[test]
    fn every_suite_rejects_bad_key() {
        for suite in SUITES {
            assert!(matches!(
                suite.encrypt(&[0u8; 16], &[0u8; 10]),
                Err(CryptoError::InvalidKeyLength(10))
            ));
        }
    }

    #[test]
    fn parse_modes() {
        assert_eq!(
            CipherSuite::parse("CBC", "pkcs7", "").unwrap(),
            CipherSuite::Cbc(PaddingScheme::Pkcs7)
        );
        assert_eq!(
            CipherSuite::parse("gcm", "ignored", "native").unwrap(),
            CipherSuite::Gcm(Compatibility::Native)
        );
        assert_eq!(
            CipherSuite::parse("gcm", "", "dotnet").unwrap(),
            CipherSuite::Gcm(Compatibility::Interop)
        );
        assert!(matches!(
            CipherSuite::parse("ecb", "pkcs7", ""),
            Err(CryptoError::UnknownMode(_))
        ));
        assert!(matches!(
            CipherSuite::parse("cbc", "zeros", ""),
            Err(CryptoError::UnknownPadding(_))
        ));
    }

    #[test]
    fn names() {
        assert_eq!(CipherSuite::default().name(), "cbc");
        assert_eq!(CipherSuite::Gcm(Compatibility::Native).name(), "gcm");
    }
}
