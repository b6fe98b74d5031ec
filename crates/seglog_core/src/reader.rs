//! Sequential reader over the raw bytes of every segment.

use crate::error::CoreResult;
use crate::record::Record;
use seglog_storage::{read_frame, Store};
use std::io::{self, Read};
use std::sync::Arc;

/// A byte stream over the store files of a log, in ascending base order.
///
/// The stream is the concatenation of framed records, suitable for bulk
/// transfer of a whole log. Use [`LogReader::next_record`] to decode it
/// frame by frame.
///
/// The reader captures the segment list when it is created. Segments
/// truncated afterwards fail the read with a closed-storage error.
#[derive(Debug)]
pub struct LogReader {
    stores: Vec<Arc<Store>>,
    current: usize,
    position: u64,
}

impl LogReader {
    pub(crate) fn new(stores: Vec<Arc<Store>>) -> Self {
        Self {
            stores,
            current: 0,
            position: 0,
        }
    }

    /// Decodes the next record from the stream.
    ///
    /// Returns `Ok(None)` once every segment has been read.
    ///
    /// # Errors
    ///
    /// Returns an error if a frame is truncated or a record fails to
    /// decode.
    pub fn next_record(&mut self) -> CoreResult<Option<Record>> {
        match read_frame(self)? {
            Some(frame) => Ok(Some(Record::decode(&frame)?)),
            None => Ok(None),
        }
    }
}

impl Read for LogReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        while let Some(store) = self.stores.get(self.current) {
            let n = store
                .read_at(buf, self.position)
                .map_err(io::Error::other)?;
            if n > 0 {
                self.position += n as u64;
                return Ok(n);
            }
            self.current += 1;
            self.position = 0;
        }

        Ok(0)
    }
}

impl Iterator for LogReader {
    type Item = CoreResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}
