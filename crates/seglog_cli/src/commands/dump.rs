//! Dump command implementation.

use super::{open_existing, RecordInfo};
use seglog_core::Config;
use std::path::Path;

/// Runs the dump command.
///
/// Walks the raw segment bytes frame by frame rather than reading offset by
/// offset, so it also shows records the index no longer reaches.
pub fn run(
    path: &Path,
    config: Config,
    limit: Option<usize>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let log = open_existing(path, config)?;
    let max_records = limit.unwrap_or(usize::MAX);

    let mut reader = log.reader()?;
    let mut records = Vec::new();
    while records.len() < max_records {
        match reader.next_record()? {
            Some(record) => records.push(RecordInfo::from(&record)),
            None => break,
        }
    }

    drop(reader);
    log.close()?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        _ => {
            print_text_output(&records);
        }
    }

    Ok(())
}

fn print_text_output(records: &[RecordInfo]) {
    println!("Records ({} total)", records.len());
    println!("================");
    println!();

    for record in records {
        println!("{}", record.to_line());
    }
}
