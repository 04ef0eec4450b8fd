//! AES-GCM authenticated encryption.
//!
//! Each blob records its nonce length and tag size in a two-byte header so
//! that producers in other languages, which may pick a nonce other than the
//! 96-bit default, can be decoded. See [`Compatibility`] for how the decoder
//! chooses parameters.
//!
//! **Never reuse a nonce under the same key.** Nonces come from the OS CSPRNG
//! on every call.

use aes::cipher::{BlockCipher, BlockEncrypt, BlockSizeUser};
use aes::{Aes128, Aes192, Aes256};
use aes_gcm::{
    aead::{
        consts::{self, U16},
        Aead, KeyInit, Nonce,
    },
    AesGcm,
};
use tracing::{debug, warn};

use crate::error::CryptoError;
use crate::rng::{OsRandom, RandomSource};
use crate::wire::GcmEnvelope;

/// Default nonce length (96 bits).
pub const NONCE_LEN: usize = 12;

/// Shortest nonce an AEAD can be built for.
pub const MIN_NONCE_LEN: usize = 1;

/// Longest nonce an AEAD can be built for.
pub const MAX_NONCE_LEN: usize = 32;

/// Authentication tag length.
pub const TAG_LEN: usize = 16;

/// How the decoder picks the AEAD parameters for a blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compatibility {
    /// Blob came from this crate's default construction (12-byte nonce).
    #[default]
    Native,
    /// Blob came from a differently configured producer; the AEAD is rebuilt
    /// from the nonce length recorded in the header.
    Interop,
}

impl Compatibility {
    /// Parse a compatibility tag, ignoring case and surrounding whitespace.
    ///
    /// `native` and the legacy tag `go` select [`Compatibility::Native`];
    /// every other tag, including the empty string, means an interop producer.
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim();
        if tag.eq_ignore_ascii_case("native") || tag.eq_ignore_ascii_case("go") {
            Compatibility::Native
        } else {
            Compatibility::Interop
        }
    }
}

/// Expand `$op::<AesGcm<$cipher, N>>$args` for the typenum `N` matching `$len`.
macro_rules! by_nonce_len {
    ($len:expr, $op:ident::<$cipher:ty> $args:tt, $fallback:expr) => {
        by_nonce_len!(@arms ($len) ($op) ($cipher) $args ($fallback)
            1 U1 2 U2 3 U3 4 U4 5 U5 6 U6 7 U7 8 U8
            9 U9 10 U10 11 U11 12 U12 13 U13 14 U14 15 U15 16 U16
            17 U17 18 U18 19 U19 20 U20 21 U21 22 U22 23 U23 24 U24
            25 U25 26 U26 27 U27 28 U28 29 U29 30 U30 31 U31 32 U32)
    };
    (@arms ($len:expr) ($op:ident) ($cipher:ty) $args:tt ($fallback:expr) $($n:literal $size:ident)*) => {
        match $len {
            $($n => $op::<AesGcm<$cipher, consts::$size>> $args,)*
            _ => $fallback,
        }
    };
}

/// Encrypt `plaintext` under `key` with a fresh 12-byte nonce.
///
/// Returns the base64 blob `nonce_len || tag_len || nonce || ciphertext || tag`.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidKeyLength`] if `key` is not 16, 24 or 32
/// bytes, or [`CryptoError::RandomSource`] if no nonce could be drawn.
pub fn encrypt(plaintext: &[u8], key: &[u8]) -> Result<String, CryptoError> {
    encrypt_with(&OsRandom, plaintext, key, NONCE_LEN)
}

/// Encrypt with a non-default nonce length, producing the layout that
/// [`Compatibility::Interop`] decoders accept.
///
/// # Errors
///
/// As [`encrypt`], plus [`CryptoError::UnsupportedNonceLength`] unless
/// `nonce_len` is within [`MIN_NONCE_LEN`]`..=`[`MAX_NONCE_LEN`].
pub fn encrypt_with_nonce_len(
    plaintext: &[u8],
    key: &[u8],
    nonce_len: usize,
) -> Result<String, CryptoError> {
    encrypt_with(&OsRandom, plaintext, key, nonce_len)
}

/// Encrypt drawing the nonce from `rng`.
pub fn encrypt_with<R>(
    rng: &R,
    plaintext: &[u8],
    key: &[u8],
    nonce_len: usize,
) -> Result<String, CryptoError>
where
    R: RandomSource + ?Sized,
{
    if !(MIN_NONCE_LEN..=MAX_NONCE_LEN).contains(&nonce_len) {
        return Err(CryptoError::UnsupportedNonceLength(nonce_len));
    }
    let mut nonce = vec![0u8; nonce_len];
    rng.fill(&mut nonce)?;

    let ciphertext = match key.len() {
        16 => seal_sized::<Aes128>(key, &nonce, plaintext)?,
        24 => seal_sized::<Aes192>(key, &nonce, plaintext)?,
        32 => seal_sized::<Aes256>(key, &nonce, plaintext)?,
        n => return Err(CryptoError::InvalidKeyLength(n)),
    };

    debug!(
        plaintext_len = plaintext.len(),
        nonce_len,
        "gcm encrypt"
    );
    GcmEnvelope {
        nonce,
        // TAG_LEN is a small constant.
        tag_len: TAG_LEN as u8,
        ciphertext,
    }
    .encode()
}

/// Authenticate and decrypt a GCM blob.
///
/// Fails closed: on any authentication error no plaintext is returned.
///
/// # Errors
///
/// - [`CryptoError::InvalidEncoding`] if `blob` is not base64.
/// - [`CryptoError::InvalidDataLength`] if the blob is shorter than its
///   two-byte header.
/// - [`CryptoError::InvalidKeyLength`] for an unsupported key size.
/// - [`CryptoError::AuthenticationFailure`] if the tag does not verify, or the
///   header announces parameters that do not fit the data or cannot be opened
///   by the selected construction.
pub fn decrypt(
    blob: &str,
    key: &[u8],
    compatibility: Compatibility,
) -> Result<Vec<u8>, CryptoError> {
    let envelope = GcmEnvelope::decode(blob)?;
    if usize::from(envelope.tag_len) != TAG_LEN {
        warn!(tag_len = envelope.tag_len, "gcm header announces unsupported tag size");
        return Err(CryptoError::AuthenticationFailure);
    }

    // Interop blobs are opened with the nonce length from header byte 0,
    // which is what the legacy header reader hands to the AEAD.
    if compatibility == Compatibility::Native && envelope.nonce.len() != NONCE_LEN {
        warn!(
            nonce_len = envelope.nonce.len(),
            "gcm nonce does not match the native construction"
        );
        return Err(CryptoError::AuthenticationFailure);
    }

    match key.len() {
        16 => open_sized::<Aes128>(key, &envelope.nonce, &envelope.ciphertext),
        24 => open_sized::<Aes192>(key, &envelope.nonce, &envelope.ciphertext),
        32 => open_sized::<Aes256>(key, &envelope.nonce, &envelope.ciphertext),
        n => Err(CryptoError::InvalidKeyLength(n)),
    }
}

/// Pick the AEAD type for the nonce length, then seal.
fn seal_sized<C>(key: &[u8], nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError>
where
    C: BlockCipher + BlockSizeUser<BlockSize = U16> + BlockEncrypt + KeyInit,
{
    by_nonce_len!(
        nonce.len(),
        seal::<C>(key, nonce, plaintext),
        Err(CryptoError::UnsupportedNonceLength(nonce.len()))
    )
}

/// Pick the AEAD type for the nonce length, then open.
fn open_sized<C>(key: &[u8], nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError>
where
    C: BlockCipher + BlockSizeUser<BlockSize = U16> + BlockEncrypt + KeyInit,
{
    by_nonce_len!(
        nonce.len(),
        open::<C>(key, nonce, ciphertext),
        {
            warn!(nonce_len = nonce.len(), "gcm header announces an unbuildable nonce length");
            Err(CryptoError::AuthenticationFailure)
        }
    )
}

fn seal<A>(key: &[u8], nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError>
where
    A: Aead + KeyInit,
{
    let cipher = A::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength(key.len()))?;
    cipher
        .encrypt(Nonce::<A>::from_slice(nonce), plaintext)
        .map_err(|_| CryptoError::InvalidDataLength(plaintext.len()))
}

fn open<A>(key: &[u8], nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError>
where
    A: Aead + KeyInit,
{
    let cipher = A::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength(key.len()))?;
    cipher
        .decrypt(Nonce::<A>::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::AuthenticationFailure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::MockRandomSource;
    use crate::wire::GCM_HEADER_LEN;
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    const LENGTHS: [usize; 6] = [0, 1, 15, 16, 17, 1000];

    fn hex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    fn zero_nonce() -> MockRandomSource {
        let mut rng = MockRandomSource::new();
        rng.expect_fill().times(1).returning(|dest| {
            dest.fill(0);
            Ok(())
        });
        rng
    }

    #[test]
    fn round_trip_all_key_sizes_and_lengths() {
        for key_len in [16, 24, 32] {
            let key = vec![0x24u8; key_len];
            for len in LENGTHS {
                let plaintext: Vec<u8> = (0..len).map(|i| (i * 7) as u8).collect();
                let blob = encrypt(&plaintext, &key).unwrap();
                assert_eq!(
                    decrypt(&blob, &key, Compatibility::Native).unwrap(),
                    plaintext
                );
                assert_eq!(
                    decrypt(&blob, &key, Compatibility::Interop).unwrap(),
                    plaintext
                );
            }
        }
    }

    #[test]
    fn header_records_nonce_and_tag_size() {
        let key = [0u8; 32];
        let blob = encrypt(b"hello world", &key).unwrap();
        let packed = STANDARD.decode(&blob).unwrap();
        assert_eq!(packed[0] as usize, NONCE_LEN);
        assert_eq!(packed[1] as usize, TAG_LEN);
        assert_eq!(packed.len(), GCM_HEADER_LEN + NONCE_LEN + 11 + TAG_LEN);
    }

    #[test]
    fn bit_flip_in_byte_five_fails_authentication() {
        let key = [0u8; 32];
        let packed = STANDARD.decode(encrypt(b"hello world", &key).unwrap()).unwrap();

        // Byte 5 of the packed blob and byte 5 of the ciphertext section.
        for index in [5, GCM_HEADER_LEN + NONCE_LEN + 5] {
            let mut tampered = packed.clone();
            tampered[index] ^= 0x01;
            assert!(matches!(
                decrypt(&STANDARD.encode(&tampered), &key, Compatibility::Native),
                Err(CryptoError::AuthenticationFailure)
            ));
        }
    }

    #[test]
    fn any_flipped_byte_fails_authentication() {
        let key = [9u8; 16];
        for plaintext in [&b""[..], &b"hello world"[..]] {
            let packed = STANDARD.decode(encrypt(plaintext, &key).unwrap()).unwrap();
            for compatibility in [Compatibility::Native, Compatibility::Interop] {
                for mask in [0x01u8, 0x04, 0x80, 0xFF] {
                    for index in 0..packed.len() {
                        let mut tampered = packed.clone();
                        tampered[index] ^= mask;
                        let result = decrypt(&STANDARD.encode(&tampered), &key, compatibility);
                        assert!(
                            matches!(result, Err(CryptoError::AuthenticationFailure)),
                            "len {} byte {index} ^{mask:#04x} under {compatibility:?}: {result:?}",
                            plaintext.len()
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let blob = encrypt(b"secret", &[1u8; 32]).unwrap();
        assert!(matches!(
            decrypt(&blob, &[2u8; 32], Compatibility::Native),
            Err(CryptoError::AuthenticationFailure)
        ));
    }

    #[test]
    fn gcm_test_case_1() {
        // Zero key, zero nonce, empty plaintext: only the tag is emitted.
        let blob = encrypt_with(&zero_nonce(), &[], &[0u8; 16], NONCE_LEN).unwrap();
        let packed = STANDARD.decode(&blob).unwrap();
        assert_eq!(
            &packed[GCM_HEADER_LEN + NONCE_LEN..],
            hex("58e2fccefa7e3061367f1d57a4e7455a").as_slice()
        );
    }

    #[test]
    fn gcm_test_case_2() {
        let blob = encrypt_with(&zero_nonce(), &[0u8; 16], &[0u8; 16], NONCE_LEN).unwrap();
        let packed = STANDARD.decode(&blob).unwrap();
        assert_eq!(
            &packed[GCM_HEADER_LEN + NONCE_LEN..],
            hex("0388dace60b6a392f328c2b971b2fe78ab6e47d42cec13bdf53a67b21257bddf").as_slice()
        );
        assert_eq!(
            decrypt(&blob, &[0u8; 16], Compatibility::Native).unwrap(),
            vec![0u8; 16]
        );
    }

    #[test]
    fn non_default_nonce_blobs_need_interop() {
        let key = [5u8; 24];
        for nonce_len in [MIN_NONCE_LEN, 8, 16, MAX_NONCE_LEN] {
            let blob = encrypt_with_nonce_len(b"from elsewhere", &key, nonce_len).unwrap();
            let packed = STANDARD.decode(&blob).unwrap();
            assert_eq!(packed[0] as usize, nonce_len);
            assert_eq!(
                decrypt(&blob, &key, Compatibility::Interop).unwrap(),
                b"from elsewhere"
            );
            assert!(matches!(
                decrypt(&blob, &key, Compatibility::Native),
                Err(CryptoError::AuthenticationFailure)
            ));
        }
    }

    #[test]
    fn interop_opens_independently_sealed_eight_byte_nonce() {
        let key = [0x3Cu8; 16];
        let nonce = [0xA5u8; 8];
        type EightByteGcm = AesGcm<Aes128, consts::U8>;
        let sealed = EightByteGcm::new_from_slice(&key)
            .unwrap()
            .encrypt(
                Nonce::<EightByteGcm>::from_slice(&nonce),
                &b"legacy payload"[..],
            )
            .unwrap();

        let mut packed = vec![8u8, TAG_LEN as u8];
        packed.extend_from_slice(&nonce);
        packed.extend_from_slice(&sealed);
        assert_eq!(
            decrypt(&STANDARD.encode(&packed), &key, Compatibility::Interop).unwrap(),
            b"legacy payload"
        );
    }

    #[test]
    fn interop_rejects_unbuildable_nonce_length() {
        // Header claims a 40-byte nonce; the data fits but no AEAD exists for it.
        let mut packed = vec![40u8, TAG_LEN as u8];
        packed.extend_from_slice(&[0u8; 40 + TAG_LEN]);
        assert!(matches!(
            decrypt(&STANDARD.encode(&packed), &[0u8; 16], Compatibility::Interop),
            Err(CryptoError::AuthenticationFailure)
        ));
    }

    #[test]
    fn unsupported_nonce_length_rejected() {
        for nonce_len in [0, MAX_NONCE_LEN + 1] {
            assert!(matches!(
                encrypt_with_nonce_len(b"x", &[0u8; 16], nonce_len),
                Err(CryptoError::UnsupportedNonceLength(n)) if n == nonce_len
            ));
        }
    }

    #[test]
    fn invalid_key_length_rejected() {
        assert!(matches!(
            encrypt(b"x", &[0u8; 10]),
            Err(CryptoError::InvalidKeyLength(10))
        ));
        let blob = encrypt(b"x", &[0u8; 16]).unwrap();
        assert!(matches!(
            decrypt(&blob, &[0u8; 10], Compatibility::Native),
            Err(CryptoError::InvalidKeyLength(10))
        ));
    }

    #[test]
    fn short_blobs_rejected() {
        assert!(matches!(
            decrypt("", &[0u8; 16], Compatibility::Native),
            Err(CryptoError::InvalidDataLength(0))
        ));
        assert!(matches!(
            decrypt(&STANDARD.encode([12u8]), &[0u8; 16], Compatibility::Native),
            Err(CryptoError::InvalidDataLength(1))
        ));
        // A complete header whose sizes overrun the data cannot be authenticated.
        let blob = STANDARD.encode([12u8, 16, 0, 0, 0]);
        for compatibility in [Compatibility::Native, Compatibility::Interop] {
            assert!(matches!(
                decrypt(&blob, &[0u8; 16], compatibility),
                Err(CryptoError::AuthenticationFailure)
            ));
        }
    }

    #[test]
    fn compatibility_tags() {
        assert_eq!(Compatibility::from_tag("native"), Compatibility::Native);
        assert_eq!(Compatibility::from_tag(" NATIVE "), Compatibility::Native);
        assert_eq!(Compatibility::from_tag("GO"), Compatibility::Native);
        assert_eq!(Compatibility::from_tag("java"), Compatibility::Interop);
        assert_eq!(Compatibility::from_tag(""), Compatibility::Interop);
    }
}
