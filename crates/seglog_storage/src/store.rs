//! Append-only store of length-prefixed frames.

use crate::error::{StorageError, StorageResult};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Width of the big-endian length prefix in front of every frame.
pub const LEN_WIDTH: u64 = 8;

/// A store file holding framed payloads.
///
/// Every [`append`](Store::append) writes one frame:
///
/// ```text
/// | len (8, BE) | payload (len) |
/// ```
///
/// # Buffering
///
/// Appends go through a buffered writer and are not on disk until the
/// buffer is drained. [`read`](Store::read), [`read_at`](Store::read_at),
/// [`flush`](Store::flush) and [`close`](Store::close) drain it first, so a
/// reader in this process always sees every acknowledged append.
///
/// # Thread Safety
///
/// The writer and the size counter live behind one mutex, so a `Store` can
/// be shared across threads (the log reader holds it through an `Arc`).
///
/// # Example
///
/// ```no_run
/// use seglog_storage::Store;
/// use std::path::Path;
///
/// let store = Store::open(Path::new("0.store")).unwrap();
/// let (written, pos) = store.append(b"persistent data").unwrap();
/// assert_eq!(written, 8 + 15);
/// assert_eq!(store.read(pos).unwrap(), b"persistent data");
/// store.close().unwrap();
/// ```
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    inner: Mutex<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    /// `None` once the store has been closed.
    writer: Option<BufWriter<File>>,
    /// Logical size including bytes still sitting in the buffer.
    size: u64,
}

impl Store {
    /// Opens or creates a store file at the given path.
    ///
    /// An existing file is opened for appending and its current length
    /// becomes the position of the next frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or created.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)?;

        let size = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            inner: Mutex::new(StoreInner {
                writer: Some(BufWriter::new(file)),
                size,
            }),
        })
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the store size in bytes, counting buffered frames.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.inner.lock().size
    }

    /// Returns whether [`close`](Store::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.lock().writer.is_none()
    }

    /// Appends one frame holding `payload`.
    ///
    /// Returns `(bytes_written, position)`: the full frame size (length
    /// prefix plus payload) and the position the frame starts at.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Closed`] after close, or an I/O error.
    pub fn append(&self, payload: &[u8]) -> StorageResult<(u64, u64)> {
        let mut inner = self.inner.lock();
        let StoreInner { writer, size } = &mut *inner;
        let writer = writer.as_mut().ok_or(StorageError::Closed)?;

        let position = *size;
        writer.write_all(&(payload.len() as u64).to_be_bytes())?;
        writer.write_all(payload)?;

        let written = LEN_WIDTH + payload.len() as u64;
        *size += written;

        Ok((written, position))
    }

    /// Reads the payload of the frame starting at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ReadPastEnd`] if the length prefix or the
    /// payload it announces extends past the end of the file.
    pub fn read(&self, position: u64) -> StorageResult<Vec<u8>> {
        let mut inner = self.inner.lock();
        let StoreInner { writer, size } = &mut *inner;
        let writer = writer.as_mut().ok_or(StorageError::Closed)?;
        writer.flush()?;
        let size = *size;

        if position.checked_add(LEN_WIDTH).map_or(true, |end| end > size) {
            return Err(StorageError::ReadPastEnd {
                position,
                len: LEN_WIDTH,
                size,
            });
        }

        let file = writer.get_mut();
        file.seek(SeekFrom::Start(position))?;

        let mut len_bytes = [0u8; LEN_WIDTH as usize];
        file.read_exact(&mut len_bytes)?;
        let len = u64::from_be_bytes(len_bytes);

        let start = position + LEN_WIDTH;
        if start.checked_add(len).map_or(true, |end| end > size) {
            return Err(StorageError::ReadPastEnd {
                position: start,
                len,
                size,
            });
        }

        let len = usize::try_from(len)
            .map_err(|_| StorageError::Corrupted(format!("frame length {len} too large")))?;
        let mut payload = vec![0u8; len];
        file.read_exact(&mut payload)?;

        Ok(payload)
    }

    /// Reads raw bytes starting at `offset`, ignoring frame boundaries.
    ///
    /// Fills as much of `buf` as the file allows and returns the number of
    /// bytes read; `0` means `offset` is at or past the end of the file.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Closed`] after close, or an I/O error.
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> StorageResult<usize> {
        let mut inner = self.inner.lock();
        let StoreInner { writer, size } = &mut *inner;
        let writer = writer.as_mut().ok_or(StorageError::Closed)?;
        writer.flush()?;

        if offset >= *size || buf.is_empty() {
            return Ok(0);
        }

        let available = *size - offset;
        let len = usize::try_from(available).map_or(buf.len(), |a| a.min(buf.len()));

        let file = writer.get_mut();
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(&mut buf[..len])?;

        Ok(len)
    }

    /// Drains buffered frames to the operating system.
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

    /// Drains buffered frames and syncs the file to durable storage.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Closed`] after close, or an I/O error.
    pub fn sync(&self) -> StorageResult<()> {
        let mut inner = self.inner.lock();
        let writer = inner.writer.as_mut().ok_or(StorageError::Closed)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    }

    /// Flushes pending frames and releases the file handle.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Closed`] if the store was already closed.
    pub fn close(&self) -> StorageResult<()> {
        let writer = self
            .inner
            .lock()
            .writer
            .take()
            .ok_or(StorageError::Closed)?;

        let file = writer.into_inner().map_err(io::IntoInnerError::into_error)?;
        drop(file);
        Ok(())
    }
}

/// Reads the next frame from a byte stream of concatenated store files.
///
/// Returns `Ok(None)` on a clean end of stream, i.e. when the stream ends
/// exactly on a frame boundary.
///
/// # Errors
///
/// Returns [`StorageError::Corrupted`] if the stream ends inside a frame.
pub fn read_frame<R: Read>(reader: &mut R) -> StorageResult<Option<Vec<u8>>> {
    let mut len_bytes = [0u8; LEN_WIDTH as usize];
    let mut filled = 0;

    while filled < len_bytes.len() {
        match reader.read(&mut len_bytes[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    if filled == 0 {
        return Ok(None);
    }
    if filled < len_bytes.len() {
        return Err(StorageError::Corrupted(format!(
            "truncated frame header: {filled} of {LEN_WIDTH} bytes"
        )));
    }

    let len = u64::from_be_bytes(len_bytes);
    let mut payload = Vec::new();
    reader.by_ref().take(len).read_to_end(&mut payload)?;

    if (payload.len() as u64) < len {
        return Err(StorageError::Corrupted(format!(
            "truncated frame payload: {} of {len} bytes",
            payload.len()
        )));
    }

    Ok(Some(payload))
}
