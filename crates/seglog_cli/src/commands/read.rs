//! Read command implementation.

use super::{open_existing, RecordInfo};
use seglog_core::Config;
use std::path::Path;

/// Runs the read command.
pub fn run(
    path: &Path,
    config: Config,
    offset: u64,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let log = open_existing(path, config)?;
    let record = log.read(offset)?;
    let info = RecordInfo::from(&record);

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        _ => {
            println!("{}", info.to_line());
        }
    }

    log.close()?;
    Ok(())
}
