//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during store and index operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Attempted to read beyond the end of the store.
    #[error("read beyond end of store: position {position}, len {len}, size {size}")]
    ReadPastEnd {
        /// The requested read position.
        position: u64,
        /// The requested read length.
        len: u64,
        /// The current store size.
        size: u64,
    },

    /// The requested index entry has not been written.
    #[error("index entry {entry} not found")]
    EntryNotFound {
        /// The requested entry number (`-1` for the last entry).
        entry: i64,
    },

    /// The index cannot hold another entry.
    #[error("index full: {size} of {capacity} bytes used")]
    IndexFull {
        /// Bytes already written.
        size: u64,
        /// Configured capacity in bytes.
        capacity: u64,
    },

    /// A file does not have the expected shape.
    #[error("storage corrupted: {0}")]
    Corrupted(String),

    /// The file handle has already been released.
    #[error("storage is closed")]
    Closed,
}

impl StorageError {
    /// Returns whether this error means "no such entry" rather than a fault.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::EntryNotFound { .. })
    }
}
