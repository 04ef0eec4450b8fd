//! Configuration loading and validation for the aescrypto tool.
//!
//! All values come from `AESCRYPTO_*` environment variables. Keys and
//! passphrases are held here only long enough to run one transform and are
//! redacted from `Debug` output.

use aescrypto::{CipherSuite, PaddingScheme};
use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;

/// Direction of the transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Encrypt,
    Decrypt,
}

/// Key material resolved from configuration.
pub enum KeyMaterial {
    /// Raw AES key bytes.
    Raw(Vec<u8>),
    /// Passphrase for the SHA-512 convenience derivation.
    Passphrase(String),
}

/// Validated tool configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// `encrypt` or `decrypt`. **Required.**
    pub operation: Operation,

    /// Cipher mode, `cbc` or `gcm`.
    #[serde(default = "default_mode")]
    pub mode: String,

    /// CBC padding, `pkcs7` or `none`.
    #[serde(default = "default_padding")]
    pub padding: String,

    /// GCM compatibility tag; anything but `native` or `go` means an interop producer.
    #[serde(default = "default_compatibility")]
    pub compatibility: String,

    /// Base64 raw AES key (16, 24 or 32 bytes once decoded).
    #[serde(default)]
    pub key: Option<String>,

    /// Passphrase for the CBC convenience wrapper.
    #[serde(default)]
    pub passphrase: Option<String>,

    /// Tracing log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_mode() -> String {
    "cbc".into()
}
fn default_padding() -> String {
    "pkcs7".into()
}
fn default_compatibility() -> String {
    "native".into()
}
fn default_log_level() -> String {
    "info".into()
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("Config")
            .field("operation", &self.operation)
            .field("mode", &self.mode)
            .field("padding", &self.padding)
            .field("compatibility", &self.compatibility)
            .field("key", &redact(&self.key))
            .field("passphrase", &redact(&self.passphrase))
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is absent or any value is invalid.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::with_prefix("AESCRYPTO"))
            .build()
            .context("failed to build aescrypto configuration")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise aescrypto configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Cipher suite selected by `mode`, `padding` and `compatibility`.
    pub fn suite(&self) -> Result<CipherSuite> {
        CipherSuite::parse(&self.mode, &self.padding, &self.compatibility)
            .context("invalid AESCRYPTO_MODE / AESCRYPTO_PADDING")
    }

    /// Resolve exactly one of `key` / `passphrase`.
    pub fn key_material(&self) -> Result<KeyMaterial> {
        match (non_empty(&self.key), non_empty(&self.passphrase)) {
            (Some(key), None) => {
                let raw = STANDARD
                    .decode(key.trim())
                    .context("AESCRYPTO_KEY must be standard base64")?;
                if !matches!(raw.len(), 16 | 24 | 32) {
                    anyhow::bail!(
                        "AESCRYPTO_KEY must decode to 16, 24 or 32 bytes, got {}",
                        raw.len()
                    );
                }
                Ok(KeyMaterial::Raw(raw))
            }
            (None, Some(passphrase)) => Ok(KeyMaterial::Passphrase(passphrase.to_owned())),
            (Some(_), Some(_)) => {
                anyhow::bail!("set only one of AESCRYPTO_KEY and AESCRYPTO_PASSPHRASE")
            }
            (None, None) => anyhow::bail!("AESCRYPTO_KEY or AESCRYPTO_PASSPHRASE is required"),
        }
    }

    fn validate(&self) -> Result<()> {
        let suite = self.suite()?;
        if let KeyMaterial::Passphrase(_) = self.key_material()? {
            if suite != CipherSuite::Cbc(PaddingScheme::Pkcs7) {
                anyhow::bail!("AESCRYPTO_PASSPHRASE is only supported with cbc / pkcs7");
            }
        }
        Ok(())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
