//! In-memory log.

use crate::commit_log::CommitLog;
use crate::error::{CoreError, CoreResult};
use crate::record::Record;
use parking_lot::RwLock;

/// A non-persistent log holding records in a vector.
///
/// Offsets start at zero and equal the record's position in the vector.
/// Useful as a [`CommitLog`] in tests and for ephemeral data.
#[derive(Debug, Default)]
pub struct MemoryLog {
    records: RwLock<Vec<Record>>,
}

impl MemoryLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns whether no record has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl CommitLog for MemoryLog {
    fn append(&self, mut record: Record) -> CoreResult<u64> {
        let mut records = self.records.write();
        let offset = records.len() as u64;
        record.offset = offset;
        records.push(record);
        Ok(offset)
    }

    fn read(&self, offset: u64) -> CoreResult<Record> {
        let records = self.records.read();
        usize::try_from(offset)
            .ok()
            .and_then(|i| records.get(i))
            .cloned()
            .ok_or_else(|| CoreError::out_of_range(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_positions() {
        let log = MemoryLog::new();
        assert!(log.is_empty());

        assert_eq!(log.append(Record::new("a")).unwrap(), 0);
        assert_eq!(log.append(Record::new("b")).unwrap(), 1);
        assert_eq!(log.len(), 2);

        let got = log.read(1).unwrap();
        assert_eq!(got.value, b"b");
        assert_eq!(got.offset, 1);
    }

    #[test]
    fn read_past_end() {
        let log = MemoryLog::new();
        log.append(Record::new("a")).unwrap();

        assert!(matches!(
            log.read(1),
            Err(CoreError::OffsetOutOfRange { offset: 1 })
        ));
        assert!(log.read(u64::MAX).unwrap_err().is_out_of_range());
    }

    #[test]
    fn caller_offset_is_overwritten() {
        let log = MemoryLog::new();
        let mut record = Record::new("x");
        record.offset = 99;

        assert_eq!(log.append(record).unwrap(), 0);
        assert_eq!(log.read(0).unwrap().offset, 0);
    }
}
