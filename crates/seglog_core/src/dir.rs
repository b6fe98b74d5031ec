//! Log directory layout.
//!
//! A log directory holds one file pair per segment, named by the segment's
//! base offset in decimal:
//!
//! ```text
//! <log_dir>/
//! ├─ 0.store        # frames of segment 0
//! ├─ 0.index        # positions of segment 0
//! ├─ 1024.store
//! └─ 1024.index
//! ```
//!
//! Nothing else may live in the directory. Scanning fails on any other
//! entry instead of skipping it.

use crate::error::{CoreError, CoreResult};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Extension of store files.
pub const STORE_EXT: &str = "store";
/// Extension of index files.
pub const INDEX_EXT: &str = "index";

/// Handle to a log directory.
#[derive(Debug, Clone)]
pub struct LogDir {
    path: PathBuf,
}

#[derive(Debug, Default)]
struct SegmentFiles {
    store_len: Option<u64>,
    index_len: Option<u64>,
}

impl LogDir {
    /// Opens a log directory, creating it if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the path exists but is not a directory, or if it
    /// cannot be created.
    pub fn create(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        if !path.is_dir() {
            return Err(CoreError::invalid_format(format!(
                "path is not a directory: {}",
                path.display()
            )));
        }

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Returns the path to the log directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path of the store file for a base offset.
    #[must_use]
    pub fn store_path(&self, base_offset: u64) -> PathBuf {
        self.path.join(format!("{base_offset}.{STORE_EXT}"))
    }

    /// Returns the path of the index file for a base offset.
    #[must_use]
    pub fn index_path(&self, base_offset: u64) -> PathBuf {
        self.path.join(format!("{base_offset}.{INDEX_EXT}"))
    }

    /// Lists the base offsets of every segment in ascending order.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidFormat`] if the directory contains an
    /// entry that is not `<u64>.store` or `<u64>.index`, or a non-empty file
    /// whose partner is missing.
    pub fn scan(&self) -> CoreResult<Vec<u64>> {
        let mut found: BTreeMap<u64, SegmentFiles> = BTreeMap::new();

        for entry in fs::read_dir(&self.path)? {
            let entry = entry?;
            let name = entry.file_name();
            let metadata = entry.metadata()?;

            let parsed = name.to_str().and_then(parse_segment_file_name);
            let Some((base_offset, ext)) = parsed.filter(|_| metadata.is_file()) else {
                return Err(CoreError::invalid_format(format!(
                    "unrecognized entry in log directory {}: {}",
                    self.path.display(),
                    name.to_string_lossy()
                )));
            };

            let files = found.entry(base_offset).or_default();
            match ext {
                STORE_EXT => files.store_len = Some(metadata.len()),
                _ => files.index_len = Some(metadata.len()),
            }
        }

        for (base_offset, files) in &found {
            match (files.store_len, files.index_len) {
                (Some(len), None) if len > 0 => {
                    return Err(CoreError::invalid_format(format!(
                        "segment {base_offset} has a store but no index"
                    )));
                }
                (None, Some(len)) if len > 0 => {
                    return Err(CoreError::invalid_format(format!(
                        "segment {base_offset} has an index but no store"
                    )));
                }
                _ => {}
            }
        }

        Ok(found.into_keys().collect())
    }

    /// Deletes a segment's file pair, tolerating a missing half.
    pub(crate) fn remove_segment_files(&self, base_offset: u64) -> CoreResult<()> {
        for path in [self.store_path(base_offset), self.index_path(base_offset)] {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Deletes the directory and everything in it.
    pub(crate) fn remove_all(&self) -> CoreResult<()> {
        match fs::remove_dir_all(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Recreates the directory after [`remove_all`](Self::remove_all).
    pub(crate) fn recreate(&self) -> CoreResult<()> {
        fs::create_dir_all(&self.path)?;
        Ok(())
    }

    /// Syncs the directory so created and deleted segment files are durable.
    #[cfg(unix)]
    pub(crate) fn sync(&self) -> CoreResult<()> {
        let dir = fs::File::open(&self.path)?;
        dir.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    pub(crate) fn sync(&self) -> CoreResult<()> {
        // NTFS journals directory metadata; there is no directory fsync
        Ok(())
    }
}

/// Parses `<base>.store` / `<base>.index`, rejecting non-canonical numbers.
fn parse_segment_file_name(name: &str) -> Option<(u64, &'static str)> {
    let (stem, ext) = name.rsplit_once('.')?;
    let ext = match ext {
        STORE_EXT => STORE_EXT,
        INDEX_EXT => INDEX_EXT,
        _ => return None,
    };

    let base_offset: u64 = stem.parse().ok()?;
    (base_offset.to_string() == stem).then_some((base_offset, ext))
}
