//! Append command implementation.

use seglog_core::{Config, Log, Record};
use std::path::Path;
use tracing::info;

/// Runs the append command.
///
/// Creates the log if it does not exist yet.
pub fn run(
    path: &Path,
    config: Config,
    values: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Appending {} records to {:?}", values.len(), path);

    let log = Log::open(path, config)?;

    for value in values {
        let offset = log.append(Record::new(value.as_bytes()))?;
        println!("{offset}");
    }

    log.close()?;
    Ok(())
}
