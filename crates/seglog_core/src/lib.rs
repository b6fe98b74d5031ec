//! # seglog core
//!
//! A segmented, append-only commit log.
//!
//! Records are appended to a [`Log`] and addressed by a dense, monotonically
//! increasing offset. On disk the log is a directory of segments, each a
//! store file of framed records plus an index file of store positions, so a
//! read by offset is one index lookup and one store read.
//!
//! This crate provides:
//! - [`Log`], the segment orchestrator with rotation and truncation
//! - [`Segment`], the unit of rotation and deletion
//! - [`Record`] and its checksummed encoding
//! - [`LogReader`] for streaming the raw bytes of a whole log
//! - [`CommitLog`], the append/read capability front ends depend on,
//!   with [`MemoryLog`] and [`Tail`]
//!
//! ## Example
//!
//! ```no_run
//! use seglog_core::{Config, Log, Record};
//!
//! let config = Config::new().max_store_bytes(64 * 1024);
//! let log = Log::open("/tmp/orders", config).unwrap();
//!
//! let offset = log.append(Record::new("order-1")).unwrap();
//! let record = log.read(offset).unwrap();
//! assert_eq!(record.value, b"order-1");
//!
//! // Drop every segment fully consumed up to `offset`
//! log.truncate(offset).unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod commit_log;
mod config;
mod dir;
mod error;
mod log;
mod memory;
mod reader;
mod record;
mod segment;
mod tail;

pub use commit_log::CommitLog;
pub use config::{Config, DEFAULT_MAX_INDEX_BYTES, DEFAULT_MAX_STORE_BYTES, MAX_INDEX_BYTES};
pub use dir::{LogDir, INDEX_EXT, STORE_EXT};
pub use error::{CoreError, CoreResult};
pub use log::Log;
pub use memory::MemoryLog;
pub use reader::LogReader;
pub use record::Record;
pub use seglog_storage::{StorageError, StorageResult};
pub use segment::{Segment, SegmentInfo};
pub use tail::Tail;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
