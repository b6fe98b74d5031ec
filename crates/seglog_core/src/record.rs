//! Log record type and its on-disk encoding.

use crate::error::{CoreError, CoreResult};
use std::time::{SystemTime, UNIX_EPOCH};

/// A record stored in the log.
///
/// The caller supplies `value` (and, through [`Record::new`], the
/// timestamp); the log assigns `offset` on append.
///
/// ## Encoding
///
/// ```text
/// | offset (8, BE) | timestamp_ms (8, BE) | value (N) | crc32 (4, BE) |
/// ```
///
/// The CRC covers everything before it. The encoded record is the payload
/// of one store frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Opaque payload.
    pub value: Vec<u8>,
    /// Position in the log; assigned on append.
    pub offset: u64,
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl Record {
    /// Header size: offset (8) + timestamp (8) = 16
    const HEADER_SIZE: usize = 16;
    /// CRC size.
    const CRC_SIZE: usize = 4;

    /// Creates a record stamped with the current time.
    #[must_use]
    pub fn new(value: impl Into<Vec<u8>>) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
        Self::with_timestamp(value, timestamp)
    }

    /// Creates a record with an explicit timestamp.
    #[must_use]
    pub fn with_timestamp(value: impl Into<Vec<u8>>, timestamp: u64) -> Self {
        Self {
            value: value.into(),
            offset: 0,
            timestamp,
        }
    }

    /// Encodes the record to bytes.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_size());

        buf.extend_from_slice(&self.offset.to_be_bytes());
        buf.extend_from_slice(&self.timestamp.to_be_bytes());
        buf.extend_from_slice(&self.value);

        let crc = crc32fast::hash(&buf);
        buf.extend_from_slice(&crc.to_be_bytes());

        buf
    }

    /// Decodes a record from bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::RecordCorruption`] if `data` is too short to be
    /// a record, or [`CoreError::ChecksumMismatch`] if the CRC disagrees.
    pub fn decode(data: &[u8]) -> CoreResult<Self> {
        if data.len() < Self::HEADER_SIZE + Self::CRC_SIZE {
            return Err(CoreError::record_corruption(format!(
                "record too short: {} bytes",
                data.len()
            )));
        }

        let (body, crc_bytes) = data.split_at(data.len() - Self::CRC_SIZE);
        let stored_crc = u32::from_be_bytes(to_array(crc_bytes)?);
        let computed_crc = crc32fast::hash(body);
        if stored_crc != computed_crc {
            return Err(CoreError::ChecksumMismatch {
                expected: stored_crc,
                actual: computed_crc,
            });
        }

        let offset = u64::from_be_bytes(to_array(&body[..8])?);
        let timestamp = u64::from_be_bytes(to_array(&body[8..Self::HEADER_SIZE])?);

        Ok(Self {
            value: body[Self::HEADER_SIZE..].to_vec(),
            offset,
            timestamp,
        })
    }

    /// Returns the encoded size of this record.
    #[must_use]
    pub fn encoded_size(&self) -> usize {
        Self::HEADER_SIZE + self.value.len() + Self::CRC_SIZE
    }
}

fn to_array<const N: usize>(bytes: &[u8]) -> CoreResult<[u8; N]> {
    bytes
        .try_into()
        .map_err(|_| CoreError::record_corruption("truncated record field"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode() {
        let mut record = Record::with_timestamp(b"hello".to_vec(), 1_700_000_000_000);
        record.offset = 42;

        let encoded = record.encode();
        assert_eq!(encoded.len(), record.encoded_size());
        assert_eq!(encoded.len(), 25);

        let decoded = Record::decode(&encoded).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn empty_value() {
        let record = Record::with_timestamp(Vec::new(), 0);
        let decoded = Record::decode(&record.encode()).unwrap();
        assert!(decoded.value.is_empty());
    }

    #[test]
    fn layout_is_big_endian() {
        let mut record = Record::with_timestamp(b"v".to_vec(), 2);
        record.offset = 1;

        let encoded = record.encode();
        assert_eq!(&encoded[..8], &[0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(&encoded[8..16], &[0, 0, 0, 0, 0, 0, 0, 2]);
        assert_eq!(&encoded[16..17], b"v");
    }

    #[test]
    fn new_stamps_current_time() {
        let record = Record::new("payload");
        assert!(record.timestamp > 0);
        assert_eq!(record.offset, 0);
        assert_eq!(record.value, b"payload");
    }

    #[test]
    fn corrupted_byte_detected() {
        let record = Record::with_timestamp(b"important".to_vec(), 5);
        let mut encoded = record.encode();
        encoded[17] ^= 0xFF;

        let result = Record::decode(&encoded);
        assert!(matches!(result, Err(CoreError::ChecksumMismatch { .. })));
    }

    #[test]
    fn too_short_rejected() {
        let result = Record::decode(&[0u8; 19]);
        assert!(matches!(result, Err(CoreError::RecordCorruption { .. })));
    }
}
