//! Offset-tracking consumer.

use crate::commit_log::CommitLog;
use crate::error::CoreResult;
use crate::record::Record;

/// Follows a log from a starting offset, one record at a time.
///
/// This is the building block for streaming consumers: poll until `None`,
/// wait, poll again. A record that is not written yet is not an error.
///
/// # Example
///
/// ```
/// use seglog_core::{CommitLog, MemoryLog, Record, Tail};
///
/// let log = MemoryLog::new();
/// log.append(Record::new("first")).unwrap();
///
/// let mut tail = Tail::new(&log, 0);
/// assert_eq!(tail.poll().unwrap().unwrap().value, b"first");
/// assert!(tail.poll().unwrap().is_none());
///
/// log.append(Record::new("second")).unwrap();
/// assert_eq!(tail.poll().unwrap().unwrap().value, b"second");
/// ```
#[derive(Debug)]
pub struct Tail<L> {
    log: L,
    next: u64,
}

impl<L: CommitLog> Tail<L> {
    /// Creates a tail that will read `offset` first.
    pub fn new(log: L, offset: u64) -> Self {
        Self { log, next: offset }
    }

    /// Returns the offset the next poll will read.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.next
    }

    /// Moves the tail to `offset`.
    pub fn seek(&mut self, offset: u64) {
        self.next = offset;
    }

    /// Reads the record at the current position and advances past it.
    ///
    /// Returns `Ok(None)`, without advancing, if the record is not
    /// available.
    ///
    /// # Errors
    ///
    /// Propagates every read error other than an out-of-range offset.
    pub fn poll(&mut self) -> CoreResult<Option<Record>> {
        match self.log.read(self.next) {
            Ok(record) => {
                self.next += 1;
                Ok(Some(record))
            }
            Err(e) if e.is_out_of_range() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Reads every available record, stopping at the first gap.
    ///
    /// # Errors
    ///
    /// Propagates the first read error other than an out-of-range offset.
    /// Records read before the error have been consumed.
    pub fn drain(&mut self) -> CoreResult<Vec<Record>> {
        let mut records = Vec::new();
        while let Some(record) = self.poll()? {
            records.push(record);
        }
        Ok(records)
    }

    /// Returns the underlying log.
    pub fn into_inner(self) -> L {
        self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::CoreError;
    use crate::log::Log;
    use crate::memory::MemoryLog;
    use tempfile::tempdir;

    #[test]
    fn poll_advances() {
        let log = MemoryLog::new();
        for value in ["a", "b"] {
            log.append(Record::new(value)).unwrap();
        }

        let mut tail = Tail::new(&log, 0);
        assert_eq!(tail.poll().unwrap().unwrap().offset, 0);
        assert_eq!(tail.position(), 1);
        assert_eq!(tail.poll().unwrap().unwrap().offset, 1);
        assert!(tail.poll().unwrap().is_none());
        assert_eq!(tail.position(), 2);
    }

    #[test]
    fn drain_and_seek() {
        let log = MemoryLog::new();
        for value in ["a", "b", "c"] {
            log.append(Record::new(value)).unwrap();
        }

        let mut tail = Tail::new(&log, 1);
        let values: Vec<Vec<u8>> = tail.drain().unwrap().into_iter().map(|r| r.value).collect();
        assert_eq!(values, vec![b"b".to_vec(), b"c".to_vec()]);

        tail.seek(0);
        assert_eq!(tail.drain().unwrap().len(), 3);
        assert!(tail.drain().unwrap().is_empty());
    }

    #[test]
    fn truncated_offset_reads_as_unavailable() {
        let temp = tempdir().unwrap();
        let log = Log::open(temp.path(), Config::new().max_store_bytes(16)).unwrap();
        for value in ["one", "two", "three"] {
            log.append(Record::new(value)).unwrap();
        }
        log.truncate(0).unwrap();

        let mut tail = Tail::new(&log, 0);
        assert!(tail.poll().unwrap().is_none());
        tail.seek(1);
        assert_eq!(tail.poll().unwrap().unwrap().value, b"two");
    }

    #[test]
    fn closed_log_is_an_error() {
        let temp = tempdir().unwrap();
        let log = Log::open(temp.path(), Config::default()).unwrap();
        log.close().unwrap();

        let mut tail = Tail::new(&log, 0);
        assert!(matches!(tail.poll(), Err(CoreError::LogClosed)));
    }
}
