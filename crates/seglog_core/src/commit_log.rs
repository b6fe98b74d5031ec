//! The capability transports drive a log through.

use crate::error::CoreResult;
use crate::log::Log;
use crate::record::Record;
use std::sync::Arc;

/// An offset-addressed record log.
///
/// Network handlers and other front ends depend on this trait rather than
/// on [`Log`], so they can be served by an in-memory log in tests.
///
/// Implementations must tell a missing offset apart from other failures:
/// [`read`](CommitLog::read) of an offset that was never written or has
/// been truncated returns an error for which
/// [`CoreError::is_out_of_range`](crate::CoreError::is_out_of_range) is
/// true.
pub trait CommitLog: Send + Sync {
    /// Appends a record and returns its offset.
    fn append(&self, record: Record) -> CoreResult<u64>;

    /// Reads the record stored at `offset`.
    fn read(&self, offset: u64) -> CoreResult<Record>;
}

impl CommitLog for Log {
    fn append(&self, record: Record) -> CoreResult<u64> {
        Log::append(self, record)
    }

    fn read(&self, offset: u64) -> CoreResult<Record> {
        Log::read(self, offset)
    }
}

impl<T: CommitLog + ?Sized> CommitLog for Arc<T> {
    fn append(&self, record: Record) -> CoreResult<u64> {
        (**self).append(record)
    }

    fn read(&self, offset: u64) -> CoreResult<Record> {
        (**self).read(offset)
    }
}

impl<T: CommitLog + ?Sized> CommitLog for &T {
    fn append(&self, record: Record) -> CoreResult<u64> {
        (**self).append(record)
    }

    fn read(&self, offset: u64) -> CoreResult<Record> {
        (**self).read(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::memory::MemoryLog;
    use tempfile::tempdir;

    fn exercise(log: &dyn CommitLog) {
        let first = log.append(Record::with_timestamp("one", 1)).unwrap();
        let second = log.append(Record::with_timestamp("two", 2)).unwrap();
        assert_eq!(second, first + 1);

        let got = log.read(second).unwrap();
        assert_eq!(got.value, b"two");
        assert_eq!(got.offset, second);
        assert!(log.read(second + 1).unwrap_err().is_out_of_range());
    }

    #[test]
    fn disk_log_as_commit_log() {
        let temp = tempdir().unwrap();
        let log = Log::open(temp.path(), Config::default()).unwrap();
        exercise(&log);
    }

    #[test]
    fn memory_log_as_commit_log() {
        exercise(&MemoryLog::new());
    }

    #[test]
    fn shared_handles_forward() {
        let log: Arc<dyn CommitLog> = Arc::new(MemoryLog::new());
        exercise(&log);
        exercise(&&*log);
    }
}
