//! Truncate command implementation.

use super::open_existing;
use seglog_core::Config;
use std::path::Path;
use tracing::info;

/// Runs the truncate command.
pub fn run(path: &Path, config: Config, lowest: u64) -> Result<(), Box<dyn std::error::Error>> {
    info!("Truncating {:?} up to offset {}", path, lowest);

    let log = open_existing(path, config)?;
    let before = log.segments()?.len();

    log.truncate(lowest)?;

    let after = log.segments()?.len();
    let lowest_offset = log.lowest_offset()?;
    log.close()?;

    println!("✓ Truncated log");
    println!("  Segments: {before} -> {after}");
    println!("  Lowest offset: {lowest_offset}");

    Ok(())
}
