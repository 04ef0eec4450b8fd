//! Single-shot stdin → stdout transform.
//!
//! Encrypt reads raw bytes and writes one base64 blob followed by a newline.
//! Decrypt reads a blob (surrounding whitespace ignored) and writes the raw
//! plaintext bytes. Only sizes and the mode are logged.

use std::io::{Read, Write};

use aescrypto::facade;
use anyhow::{Context, Result};
use tracing::info;

use crate::config::{Config, KeyMaterial, Operation};

/// Run the configured operation over `input`, writing to `output`.
///
/// # Errors
///
/// Returns an error on I/O failure or if the cipher layer rejects the input.
pub fn run<R, W>(cfg: &Config, mut input: R, mut output: W) -> Result<()>
where
    R: Read,
    W: Write,
{
    let suite = cfg.suite()?;
    let key = cfg.key_material()?;

    let mut data = Vec::new();
    input
        .read_to_end(&mut data)
        .context("failed to read input")?;

    let written = match cfg.operation {
        Operation::Encrypt => {
            let blob = match &key {
                KeyMaterial::Raw(raw) => suite.encrypt(&data, raw),
                KeyMaterial::Passphrase(passphrase) => facade::encrypt(&data, passphrase),
            }
            .context("encryption failed")?;
            writeln!(output, "{blob}").context("failed to write output")?;
            blob.len() + 1
        }
        Operation::Decrypt => {
            let blob = std::str::from_utf8(&data)
                .context("encrypted input must be base64 text")?
                .trim();
            let plaintext = match &key {
                KeyMaterial::Raw(raw) => suite.decrypt(blob, raw),
                KeyMaterial::Passphrase(passphrase) => facade::decrypt(blob, passphrase),
            }
            .context("decryption failed")?;
            output
                .write_all(&plaintext)
                .context("failed to write output")?;
            plaintext.len()
        }
    };
    output.flush().context("failed to flush output")?;

    info!(
        operation = ?cfg.operation,
        mode = suite.name(),
        input_len = data.len(),
        output_len = written,
        "transform complete"
    );
    Ok(())
}
