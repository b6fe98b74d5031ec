//! Error types for seglog core.

use seglog_storage::StorageError;
use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in log operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Store or index error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O error outside a store or index (directory handling).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No record exists at the offset, either not yet written or truncated.
    #[error("offset out of range: {offset}")]
    OffsetOutOfRange {
        /// The requested offset.
        offset: u64,
    },

    /// A stored record could not be decoded.
    #[error("record corruption: {message}")]
    RecordCorruption {
        /// Description of the corruption.
        message: String,
    },

    /// Checksum mismatch detected.
    #[error("checksum mismatch: expected {expected:08x}, got {actual:08x}")]
    ChecksumMismatch {
        /// Checksum stored with the record.
        expected: u32,
        /// Checksum computed over the stored bytes.
        actual: u32,
    },

    /// The log directory holds something other than segment files.
    #[error("invalid log format: {message}")]
    InvalidFormat {
        /// Description of the format issue.
        message: String,
    },

    /// The configuration cannot be used.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Why the configuration was rejected.
        message: String,
    },

    /// Operation not permitted in current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why operation is invalid.
        message: String,
    },

    /// The log has been closed or removed.
    #[error("log is closed")]
    LogClosed,
}

impl CoreError {
    /// Creates an offset out of range error.
    pub fn out_of_range(offset: u64) -> Self {
        Self::OffsetOutOfRange { offset }
    }

    /// Creates a record corruption error.
    pub fn record_corruption(message: impl Into<String>) -> Self {
        Self::RecordCorruption {
            message: message.into(),
        }
    }

    /// Creates an invalid format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Returns whether the error means "no record at this offset".
    ///
    /// Tail readers treat this as "retry later" rather than a failure.
    #[must_use]
    pub fn is_out_of_range(&self) -> bool {
        match self {
            Self::OffsetOutOfRange { .. } => true,
            Self::Storage(e) => e.is_not_found(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_is_distinguishable() {
        assert!(CoreError::out_of_range(7).is_out_of_range());
        assert!(CoreError::from(StorageError::EntryNotFound { entry: 3 }).is_out_of_range());

        assert!(!CoreError::LogClosed.is_out_of_range());
        assert!(!CoreError::record_corruption("bad").is_out_of_range());
        assert!(!CoreError::from(StorageError::Closed).is_out_of_range());
    }

    #[test]
    fn messages() {
        assert_eq!(
            CoreError::out_of_range(42).to_string(),
            "offset out of range: 42"
        );
        assert_eq!(
            CoreError::ChecksumMismatch {
                expected: 0xdead_beef,
                actual: 1
            }
            .to_string(),
            "checksum mismatch: expected deadbeef, got 00000001"
        );
    }
}
