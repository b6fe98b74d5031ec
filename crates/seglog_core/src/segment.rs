//! Log segments.
//!
//! A segment is the unit of rotation and deletion. It covers the offsets
//! `base_offset..next_offset` and owns the store and index file sharing its
//! base offset.

use crate::config::Config;
use crate::dir::LogDir;
use crate::error::{CoreError, CoreResult};
use crate::record::Record;
use seglog_storage::{Index, StorageError, Store};
use std::sync::Arc;
use tracing::debug;

/// A bounded run of records backed by one store and one index.
#[derive(Debug)]
pub struct Segment {
    base_offset: u64,
    next_offset: u64,
    store: Arc<Store>,
    index: Index,
    max_store_bytes: u64,
}

/// Point-in-time description of a segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentInfo {
    /// Lowest offset the segment can hold.
    pub base_offset: u64,
    /// Offset the next append to this segment would get.
    pub next_offset: u64,
    /// Store size in bytes.
    pub store_bytes: u64,
    /// Index size in bytes.
    pub index_bytes: u64,
}

impl SegmentInfo {
    /// Returns the number of records in the segment.
    #[must_use]
    pub fn record_count(&self) -> u64 {
        self.next_offset - self.base_offset
    }
}

impl Segment {
    /// Opens or creates the segment starting at `base_offset`.
    ///
    /// The next offset is recovered from the last index entry, so a
    /// restarted process resumes numbering without replaying the store.
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be opened or the index is
    /// corrupted.
    pub fn open(dir: &LogDir, base_offset: u64, config: &Config) -> CoreResult<Self> {
        let store = Store::open(&dir.store_path(base_offset))?;
        let index = Index::open(&dir.index_path(base_offset), config.max_index_bytes)?;

        let next_offset = match index.read(-1) {
            Ok((relative, _)) => base_offset
                .checked_add(u64::from(relative) + 1)
                .ok_or_else(|| {
                    CoreError::invalid_format(format!(
                        "segment {base_offset} records relative offset {relative} past u64::MAX"
                    ))
                })?,
            Err(e) if e.is_not_found() => base_offset,
            Err(e) => return Err(e.into()),
        };

        debug!(
            base_offset,
            next_offset,
            store_bytes = store.size(),
            "opened segment"
        );

        Ok(Self {
            base_offset,
            next_offset,
            store: Arc::new(store),
            index,
            max_store_bytes: config.max_store_bytes,
        })
    }

    /// Returns the lowest offset this segment can hold.
    #[must_use]
    pub fn base_offset(&self) -> u64 {
        self.base_offset
    }

    /// Returns the offset the next append will be assigned.
    #[must_use]
    pub fn next_offset(&self) -> u64 {
        self.next_offset
    }

    /// Returns the number of records in the segment.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.next_offset - self.base_offset
    }

    /// Returns whether the segment holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.next_offset == self.base_offset
    }

    /// Returns whether `offset` falls inside this segment.
    #[must_use]
    pub fn contains(&self, offset: u64) -> bool {
        self.base_offset <= offset && offset < self.next_offset
    }

    /// Appends a record, returning the offset it was assigned.
    ///
    /// The store frame is written before the index entry; a crash between
    /// the two leaves an unindexed frame at the end of the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is full, if the relative offset no
    /// longer fits in 32 bits, if `u64::MAX` would be assigned, or on I/O
    /// failure.
    pub fn append(&mut self, mut record: Record) -> CoreResult<u64> {
        let offset = self.next_offset;
        let next_offset = offset
            .checked_add(1)
            .ok_or_else(|| CoreError::invalid_operation("offset space exhausted"))?;
        let relative = u32::try_from(offset - self.base_offset).map_err(|_| {
            CoreError::invalid_operation(format!(
                "segment {} cannot address offset {offset}",
                self.base_offset
            ))
        })?;

        if self.index.is_full() {
            return Err(StorageError::IndexFull {
                size: self.index.size(),
                capacity: self.index.capacity(),
            }
            .into());
        }

        record.offset = offset;
        let (_, position) = self.store.append(&record.encode())?;
        self.index.write(relative, position)?;
        self.next_offset = next_offset;

        Ok(offset)
    }

    /// Reads the record at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::OffsetOutOfRange`] if the offset is outside the
    /// segment, and a decode error if the stored bytes are damaged.
    pub fn read(&self, offset: u64) -> CoreResult<Record> {
        if !self.contains(offset) {
            return Err(CoreError::out_of_range(offset));
        }

        let relative = offset - self.base_offset;
        let entry = i64::try_from(relative).map_err(|_| CoreError::out_of_range(offset))?;
        let (_, position) = self.index.read(entry).map_err(|e| {
            if e.is_not_found() {
                CoreError::out_of_range(offset)
            } else {
                e.into()
            }
        })?;

        let data = self.store.read(position)?;
        let record = Record::decode(&data)?;

        if record.offset != offset {
            return Err(CoreError::record_corruption(format!(
                "index entry for offset {offset} points at record {}",
                record.offset
            )));
        }

        Ok(record)
    }

    /// Returns whether the segment has reached a size limit.
    ///
    /// True once the store has grown past its limit or the index has no
    /// room for another entry.
    #[must_use]
    pub fn is_maxed(&self) -> bool {
        self.store.size() > self.max_store_bytes || self.index.is_full()
    }

    /// Returns a snapshot of the segment's offsets and sizes.
    #[must_use]
    pub fn info(&self) -> SegmentInfo {
        SegmentInfo {
            base_offset: self.base_offset,
            next_offset: self.next_offset,
            store_bytes: self.store.size(),
            index_bytes: self.index.size(),
        }
    }

    /// Returns a shared handle to the store, for sequential readers.
    pub(crate) fn store(&self) -> Arc<Store> {
        Arc::clone(&self.store)
    }

    /// Drains buffered writes of both files.
    ///
    /// # Errors
    ///
    /// Returns an error if either file is closed or cannot be flushed.
    pub fn flush(&self) -> CoreResult<()> {
        self.store.flush()?;
        self.index.flush()?;
        Ok(())
    }

    /// Closes both files without deleting them.
    ///
    /// # Errors
    ///
    /// Returns an error if either file was already closed or cannot be
    /// flushed.
    pub fn close(&self) -> CoreResult<()> {
        let store = self.store.close();
        let index = self.index.close();
        store?;
        index?;
        Ok(())
    }

    /// Closes and deletes both files.
    ///
    /// Can be retried after a failure: files that are already closed or
    /// already deleted are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing or deleting fails.
    pub fn remove(&self, dir: &LogDir) -> CoreResult<()> {
        match self.close() {
            Ok(()) | Err(CoreError::Storage(StorageError::Closed)) => {}
            Err(e) => return Err(e),
        }
        dir.remove_segment_files(self.base_offset)?;
        debug!(base_offset = self.base_offset, "removed segment");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seglog_storage::INDEX_ENTRY_WIDTH;
    use tempfile::tempdir;

    fn record(value: &str) -> Record {
        Record::with_timestamp(value.as_bytes().to_vec(), 7)
    }

    #[test]
    fn new_segment_starts_at_base() {
        let temp = tempdir().unwrap();
        let dir = LogDir::create(temp.path()).unwrap();

        let segment = Segment::open(&dir, 16, &Config::default()).unwrap();
        assert_eq!(segment.base_offset(), 16);
        assert_eq!(segment.next_offset(), 16);
        assert!(segment.is_empty());
        assert!(!segment.is_maxed());
        assert!(dir.store_path(16).exists());
        assert!(dir.index_path(16).exists());
    }

    #[test]
    fn append_and_read() {
        let temp = tempdir().unwrap();
        let dir = LogDir::create(temp.path()).unwrap();
        let mut segment = Segment::open(&dir, 16, &Config::default()).unwrap();

        for (i, value) in ["a", "b", "c"].iter().enumerate() {
            let offset = segment.append(record(value)).unwrap();
            assert_eq!(offset, 16 + i as u64);
        }

        assert_eq!(segment.len(), 3);
        let got = segment.read(17).unwrap();
        assert_eq!(got.value, b"b");
        assert_eq!(got.offset, 17);
        assert_eq!(got.timestamp, 7);
    }

    #[test]
    fn read_outside_segment_is_out_of_range() {
        let temp = tempdir().unwrap();
        let dir = LogDir::create(temp.path()).unwrap();
        let mut segment = Segment::open(&dir, 10, &Config::default()).unwrap();
        segment.append(record("x")).unwrap();

        assert!(segment.read(9).unwrap_err().is_out_of_range());
        assert!(segment.read(11).unwrap_err().is_out_of_range());
    }

    #[test]
    fn next_offset_recovered_on_reopen() {
        let temp = tempdir().unwrap();
        let dir = LogDir::create(temp.path()).unwrap();
        let config = Config::default();

        {
            let mut segment = Segment::open(&dir, 5, &config).unwrap();
            segment.append(record("one")).unwrap();
            segment.append(record("two")).unwrap();
            segment.close().unwrap();
        }

        let mut segment = Segment::open(&dir, 5, &config).unwrap();
        assert_eq!(segment.next_offset(), 7);
        assert_eq!(segment.read(6).unwrap().value, b"two");
        assert_eq!(segment.append(record("three")).unwrap(), 7);
    }

    #[test]
    fn maxed_by_store_size() {
        let temp = tempdir().unwrap();
        let dir = LogDir::create(temp.path()).unwrap();
        let config = Config::new().max_store_bytes(40);
        let mut segment = Segment::open(&dir, 0, &config).unwrap();

        // 8 + 20 + 5 = 33 bytes per frame
        segment.append(record("alpha")).unwrap();
        assert!(!segment.is_maxed());
        segment.append(record("bravo")).unwrap();
        assert!(segment.is_maxed());
    }

    #[test]
    fn maxed_by_index_capacity() {
        let temp = tempdir().unwrap();
        let dir = LogDir::create(temp.path()).unwrap();
        let config = Config::new().max_index_bytes(INDEX_ENTRY_WIDTH * 2);
        let mut segment = Segment::open(&dir, 0, &config).unwrap();

        segment.append(record("a")).unwrap();
        assert!(!segment.is_maxed());
        segment.append(record("b")).unwrap();
        assert!(segment.is_maxed());

        let result = segment.append(record("c"));
        assert!(matches!(
            result,
            Err(CoreError::Storage(StorageError::IndexFull { .. }))
        ));
        // Rejected before touching the store
        assert_eq!(segment.info().store_bytes, 2 * (8 + 21));
    }

    #[test]
    fn remove_deletes_files() {
        let temp = tempdir().unwrap();
        let dir = LogDir::create(temp.path()).unwrap();
        let mut segment = Segment::open(&dir, 0, &Config::default()).unwrap();
        segment.append(record("gone")).unwrap();

        segment.remove(&dir).unwrap();
        assert!(!dir.store_path(0).exists());
        assert!(!dir.index_path(0).exists());
    }

    #[test]
    fn remove_can_be_retried() {
        let temp = tempdir().unwrap();
        let dir = LogDir::create(temp.path()).unwrap();
        let mut segment = Segment::open(&dir, 0, &Config::default()).unwrap();
        segment.append(record("a")).unwrap();

        segment.close().unwrap();
        segment.remove(&dir).unwrap();
        assert!(!dir.store_path(0).exists());

        segment.remove(&dir).unwrap();
    }

    #[test]
    fn append_stops_before_offset_overflow() {
        let temp = tempdir().unwrap();
        let dir = LogDir::create(temp.path()).unwrap();
        let config = Config::default();
        let mut segment = Segment::open(&dir, u64::MAX - 1, &config).unwrap();

        assert_eq!(segment.append(record("last")).unwrap(), u64::MAX - 1);
        assert_eq!(segment.next_offset(), u64::MAX);

        let store_bytes = segment.info().store_bytes;
        assert!(matches!(
            segment.append(record("overflow")),
            Err(CoreError::InvalidOperation { .. })
        ));
        assert_eq!(segment.info().store_bytes, store_bytes);
        segment.close().unwrap();

        let segment = Segment::open(&dir, u64::MAX - 1, &config).unwrap();
        assert_eq!(segment.next_offset(), u64::MAX);
        assert_eq!(segment.read(u64::MAX - 1).unwrap().value, b"last");
    }

    #[test]
    fn double_close_fails() {
        let temp = tempdir().unwrap();
        let dir = LogDir::create(temp.path()).unwrap();
        let segment = Segment::open(&dir, 0, &Config::default()).unwrap();

        segment.close().unwrap();
        assert!(matches!(
            segment.close(),
            Err(CoreError::Storage(StorageError::Closed))
        ));
    }

    #[test]
    fn info_reports_sizes() {
        let temp = tempdir().unwrap();
        let dir = LogDir::create(temp.path()).unwrap();
        let mut segment = Segment::open(&dir, 3, &Config::default()).unwrap();
        segment.append(record("abc")).unwrap();

        let info = segment.info();
        assert_eq!(info.base_offset, 3);
        assert_eq!(info.next_offset, 4);
        assert_eq!(info.record_count(), 1);
        assert_eq!(info.store_bytes, 8 + 23);
        assert_eq!(info.index_bytes, INDEX_ENTRY_WIDTH);
    }
}
