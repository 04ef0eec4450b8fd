//! Telemetry initialisation for the aescrypto tool.
//!
//! Logs are written to stderr because stdout is reserved for the blob or
//! plaintext, which callers pipe into other programs.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Initialise the JSON tracing subscriber on stderr.
///
/// `RUST_LOG` takes precedence over the configured level.
///
/// # Errors
///
/// Returns an error if the subscriber has already been set.
pub fn init(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise aescrypto tracing subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_fails() {
        // Another test may already have installed a subscriber; either way
        // the global slot is taken after this call.
        let _ = init("debug");
        assert!(init("debug").is_err());
    }
}
