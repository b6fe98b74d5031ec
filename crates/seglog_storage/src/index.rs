//! Fixed-width position index.

use crate::error::{StorageError, StorageResult};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Width of the relative-offset field.
const OFFSET_WIDTH: u64 = 4;
/// Width of the store-position field.
const POSITION_WIDTH: u64 = 8;
/// Width of one index entry.
pub const INDEX_ENTRY_WIDTH: u64 = OFFSET_WIDTH + POSITION_WIDTH;

/// An index file mapping relative offsets to store positions.
///
/// Entry `i` lives at byte `i * INDEX_ENTRY_WIDTH`, so a lookup is one
/// multiplication and one positional read:
///
/// ```text
/// | relative_offset (4, BE) | position (8, BE) |
/// ```
///
/// The index does not check that relative offsets are dense; the owning
/// segment writes `0, 1, 2, ...` in order.
///
/// # Capacity
///
/// `capacity` bounds the file size in bytes. A write that would take the
/// file past it fails with [`StorageError::IndexFull`].
#[derive(Debug)]
pub struct Index {
    path: PathBuf,
    capacity: u64,
    inner: Mutex<IndexInner>,
}

#[derive(Debug)]
struct IndexInner {
    writer: Option<BufWriter<File>>,
    size: u64,
}

impl Index {
    /// Opens or creates an index file holding at most `capacity` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Corrupted`] if an existing file does not hold
    /// a whole number of entries, or an I/O error.
    pub fn open(path: &Path, capacity: u64) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)?;

        let size = file.metadata()?.len();
        if size % INDEX_ENTRY_WIDTH != 0 {
            return Err(StorageError::Corrupted(format!(
                "index {} has {size} bytes, not a multiple of {INDEX_ENTRY_WIDTH}",
                path.display()
            )));
        }

        Ok(Self {
            path: path.to_path_buf(),
            capacity,
            inner: Mutex::new(IndexInner {
                writer: Some(BufWriter::new(file)),
                size,
            }),
        })
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn name(&self) -> &Path {
        &self.path
    }

    /// Returns the index size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.inner.lock().size
    }

    /// Returns the configured capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Returns the number of entries written.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.size() / INDEX_ENTRY_WIDTH
    }

    /// Returns whether no entry has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Returns whether another entry would exceed the capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.size() + INDEX_ENTRY_WIDTH > self.capacity
    }

    /// Appends one entry.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::IndexFull`] when there is no room for the
    /// entry, [`StorageError::Closed`] after close, or an I/O error.
    pub fn write(&self, relative_offset: u32, position: u64) -> StorageResult<()> {
        let mut inner = self.inner.lock();
        let IndexInner { writer, size } = &mut *inner;
        let writer = writer.as_mut().ok_or(StorageError::Closed)?;

        if *size + INDEX_ENTRY_WIDTH > self.capacity {
            return Err(StorageError::IndexFull {
                size: *size,
                capacity: self.capacity,
            });
        }

        let mut entry = [0u8; INDEX_ENTRY_WIDTH as usize];
        entry[..OFFSET_WIDTH as usize].copy_from_slice(&relative_offset.to_be_bytes());
        entry[OFFSET_WIDTH as usize..].copy_from_slice(&position.to_be_bytes());
        writer.write_all(&entry)?;

        *size += INDEX_ENTRY_WIDTH;
        Ok(())
    }

    /// Reads an entry, returning `(relative_offset, position)`.
    ///
    /// `entry >= 0` addresses the zero-based entry; `-1` addresses the most
    /// recently written one.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::EntryNotFound`] when the index is empty, when
    /// `entry` is past the last written entry, or for any other negative
    /// value.
    pub fn read(&self, entry: i64) -> StorageResult<(u32, u64)> {
        let mut inner = self.inner.lock();
        let IndexInner { writer, size } = &mut *inner;
        let writer = writer.as_mut().ok_or(StorageError::Closed)?;

        let count = *size / INDEX_ENTRY_WIDTH;
        let slot = match entry {
            -1 if count > 0 => count - 1,
            e if e >= 0 && (e as u64) < count => e as u64,
            _ => return Err(StorageError::EntryNotFound { entry }),
        };

        writer.flush()?;
        let file = writer.get_mut();
        file.seek(SeekFrom::Start(slot * INDEX_ENTRY_WIDTH))?;

        let mut buf = [0u8; INDEX_ENTRY_WIDTH as usize];
        file.read_exact(&mut buf)?;

        let mut offset_bytes = [0u8; OFFSET_WIDTH as usize];
        offset_bytes.copy_from_slice(&buf[..OFFSET_WIDTH as usize]);
        let mut position_bytes = [0u8; POSITION_WIDTH as usize];
        position_bytes.copy_from_slice(&buf[OFFSET_WIDTH as usize..]);

        Ok((
            u32::from_be_bytes(offset_bytes),
            u64::from_be_bytes(position_bytes),
        ))
    }

    /// Drains buffered entries to the operating system.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Closed`] after close, or an I/O error.
    pub fn flush(&self) -> StorageResult<()> {
        let mut inner = self.inner.lock();
        let writer = inner.writer.as_mut().ok_or(StorageError::Closed)?;
        writer.flush()?;
        Ok(())
    }

    /// Flushes pending entries and releases the file handle.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Closed`] if the index was already closed.
    pub fn close(&self) -> StorageResult<()> {
        let writer = self
            .inner
            .lock()
            .writer
            .take()
            .ok_or(StorageError::Closed)?;

        let file = writer.into_inner().map_err(io::IntoInnerError::into_error)?;
        file.sync_all()?;
        Ok(())
    }
}
