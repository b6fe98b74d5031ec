//! Log configuration.

use crate::error::{CoreError, CoreResult};
use seglog_storage::INDEX_ENTRY_WIDTH;

/// Store size a segment may exceed before rotation, when unset.
pub const DEFAULT_MAX_STORE_BYTES: u64 = 1024;

/// Index size a segment may reach before rotation, when unset.
pub const DEFAULT_MAX_INDEX_BYTES: u64 = 1024;

/// Largest usable index limit: one entry per 32-bit relative offset.
pub const MAX_INDEX_BYTES: u64 = INDEX_ENTRY_WIDTH * (1 << 32);

/// Configuration for opening a log.
///
/// A limit left at `0` means "use the default".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Store size in bytes past which the active segment is sealed.
    pub max_store_bytes: u64,

    /// Index capacity in bytes; the segment is sealed once it is full.
    pub max_index_bytes: u64,

    /// Base offset of the first segment of a fresh log.
    pub initial_offset: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_store_bytes: DEFAULT_MAX_STORE_BYTES,
            max_index_bytes: DEFAULT_MAX_INDEX_BYTES,
            initial_offset: 0,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the store size limit.
    #[must_use]
    pub const fn max_store_bytes(mut self, bytes: u64) -> Self {
        self.max_store_bytes = bytes;
        self
    }

    /// Sets the index size limit.
    #[must_use]
    pub const fn max_index_bytes(mut self, bytes: u64) -> Self {
        self.max_index_bytes = bytes;
        self
    }

    /// Sets the base offset of a fresh log.
    #[must_use]
    pub const fn initial_offset(mut self, offset: u64) -> Self {
        self.initial_offset = offset;
        self
    }

    /// Replaces unset (zero) limits with their defaults.
    #[must_use]
    pub const fn normalized(mut self) -> Self {
        if self.max_store_bytes == 0 {
            self.max_store_bytes = DEFAULT_MAX_STORE_BYTES;
        }
        if self.max_index_bytes == 0 {
            self.max_index_bytes = DEFAULT_MAX_INDEX_BYTES;
        }
        self
    }

    /// Checks that every segment can hold at least one record and fills
    /// up before its relative offsets run out.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if the index limit is smaller
    /// than one index entry or larger than [`MAX_INDEX_BYTES`].
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_index_bytes < INDEX_ENTRY_WIDTH {
            return Err(CoreError::invalid_config(format!(
                "max_index_bytes {} is smaller than one index entry ({INDEX_ENTRY_WIDTH} bytes)",
                self.max_index_bytes
            )));
        }
        if self.max_index_bytes > MAX_INDEX_BYTES {
            return Err(CoreError::invalid_config(format!(
                "max_index_bytes {} exceeds {MAX_INDEX_BYTES}, the size of 2^32 index entries",
                self.max_index_bytes
            )));
        }
        Ok(())
    }
}
