//! Inspect command implementation.

use super::open_existing;
use seglog_core::{Config, SegmentInfo};
use serde::Serialize;
use std::path::Path;

/// Log inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Log directory.
    pub path: String,
    /// Base offset of the oldest segment.
    pub lowest_offset: u64,
    /// Offset of the last record.
    pub highest_offset: u64,
    /// Offset the next append will get.
    pub next_offset: u64,
    /// Records across all segments.
    pub record_count: u64,
    /// Store and index bytes across all segments.
    pub total_bytes: u64,
    /// Per-segment statistics, oldest first.
    pub segments: Vec<SegmentStats>,
}

/// Statistics for a single segment.
#[derive(Debug, Serialize)]
pub struct SegmentStats {
    /// Base offset.
    pub base_offset: u64,
    /// Next offset.
    pub next_offset: u64,
    /// Number of records.
    pub record_count: u64,
    /// Store size in bytes.
    pub store_bytes: u64,
    /// Index size in bytes.
    pub index_bytes: u64,
}

impl From<&SegmentInfo> for SegmentStats {
    fn from(info: &SegmentInfo) -> Self {
        Self {
            base_offset: info.base_offset,
            next_offset: info.next_offset,
            record_count: info.record_count(),
            store_bytes: info.store_bytes,
            index_bytes: info.index_bytes,
        }
    }
}

/// Runs the inspect command.
pub fn run(path: &Path, config: Config, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let log = open_existing(path, config)?;

    let segments: Vec<SegmentStats> = log.segments()?.iter().map(SegmentStats::from).collect();
    let result = InspectResult {
        path: path.display().to_string(),
        lowest_offset: log.lowest_offset()?,
        highest_offset: log.highest_offset()?,
        next_offset: log.next_offset()?,
        record_count: segments.iter().map(|s| s.record_count).sum(),
        total_bytes: segments.iter().map(|s| s.store_bytes + s.index_bytes).sum(),
        segments,
    };

    log.close()?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

fn print_text_output(result: &InspectResult) {
    println!("seglog Log Inspection");
    println!("=====================");
    println!();
    println!("Path: {}", result.path);
    println!();
    println!("Offsets:");
    println!("  Lowest:  {}", result.lowest_offset);
    println!("  Highest: {}", result.highest_offset);
    println!("  Next:    {}", result.next_offset);
    println!();
    println!("Records: {}", result.record_count);
    println!("Size:    {} bytes", result.total_bytes);
    println!();
    println!("Segments ({}):", result.segments.len());
    println!(
        "  {:>12} {:>12} {:>8} {:>12} {:>12}",
        "base", "next", "records", "store", "index"
    );
    for segment in &result.segments {
        println!(
            "  {:>12} {:>12} {:>8} {:>12} {:>12}",
            segment.base_offset,
            segment.next_offset,
            segment.record_count,
            segment.store_bytes,
            segment.index_bytes
        );
    }
}
