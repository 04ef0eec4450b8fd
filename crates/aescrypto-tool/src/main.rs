//! `aescrypto-tool`: encrypt or decrypt one payload from stdin.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`](config::Config) from environment variables.
//! 2. Initialise structured JSON logging on stderr.
//! 3. Read stdin, transform it, write the result to stdout.

mod config;
mod telemetry;
mod transform;

use anyhow::Result;

fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = config::Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: aescrypto configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;

    // -----------------------------------------------------------------------
    // 3. Transform
    // -----------------------------------------------------------------------
    let stdin = std::io::stdin().lock();
    let stdout = std::io::stdout().lock();
    transform::run(&cfg, stdin, stdout)
}
