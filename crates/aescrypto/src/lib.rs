//! AES-CBC and AES-GCM encryption with a portable packed-ciphertext format.
//!
//! ```text
//! plaintext + key -> cipher path (pad if CBC) -> pack -> base64 blob
//! ```
//!
//! Every call is stateless: IVs and nonces are drawn fresh from the OS CSPRNG
//! and nothing is cached between calls, so encryption and decryption may run
//! on any number of threads at once.

pub mod cbc;
pub mod error;
pub mod facade;
pub mod gcm;
pub mod padding;
pub mod rng;
pub mod suite;
pub mod wire;

pub use error::CryptoError;
pub use gcm::Compatibility;
pub use padding::PaddingScheme;
pub use suite::CipherSuite;
