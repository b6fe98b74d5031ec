//! Reset command implementation.

use super::open_existing;
use seglog_core::Config;
use std::path::Path;
use tracing::info;

/// Runs the reset command.
pub fn run(path: &Path, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    info!("Resetting {:?}", path);

    let log = open_existing(path, config)?;
    log.reset()?;
    let next_offset = log.next_offset()?;
    log.close()?;

    println!("✓ Reset log");
    println!("  Next offset: {next_offset}");

    Ok(())
}
