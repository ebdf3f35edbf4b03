//! Journal record framing.
//!
//! Each record is framed as:
//!
//! ```text
//! magic (4) | version (2) | type (1) | body length (4) | body | crc32 (4)
//! ```
//!
//! The CRC covers everything before it. A record whose frame does not
//! check out marks the end of the readable journal; replay stops there
//! and the tail is truncated.

use crate::error::QueueResult;
use crate::item::QueueItem;

/// Magic bytes identifying a FieldSync queue journal record.
pub const JOURNAL_MAGIC: [u8; 4] = *b"FSQJ";

/// Current journal format version.
pub const JOURNAL_VERSION: u16 = 1;

/// Frame header size: magic (4) + version (2) + type (1) + length (4).
pub const HEADER_SIZE: usize = 11;

/// CRC trailer size.
pub const CRC_SIZE: usize = 4;

/// A journaled queue mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum JournalRecord {
    /// Full state of an item (insert or update); replay keeps the last
    /// state seen per id.
    Upsert(Box<QueueItem>),
    /// Item removed (acknowledged and collected, or discarded).
    Remove(u64),
}

impl JournalRecord {
    /// Type code used in the frame header.
    pub fn type_code(&self) -> u8 {
        match self {
            JournalRecord::Upsert(_) => 1,
            JournalRecord::Remove(_) => 2,
        }
    }

    /// Serializes the record body (without the frame envelope).
    pub fn encode_body(&self) -> QueueResult<Vec<u8>> {
        match self {
            JournalRecord::Upsert(item) => Ok(serde_json::to_vec(item)?),
            JournalRecord::Remove(id) => Ok(id.to_le_bytes().to_vec()),
        }
    }

    /// Deserializes a record from its type code and body.
    ///
    /// Returns `None` for an unknown type code or a malformed body; the
    /// caller treats that as the end of the readable journal.
    pub fn decode_body(type_code: u8, body: &[u8]) -> Option<Self> {
        match type_code {
            1 => serde_json::from_slice(body)
                .ok()
                .map(|item| JournalRecord::Upsert(Box::new(item))),
            2 => {
                let bytes: [u8; 8] = body.try_into().ok()?;
                Some(JournalRecord::Remove(u64::from_le_bytes(bytes)))
            }
            _ => None,
        }
    }

    /// Builds the full framed bytes for this record.
    pub fn encode_frame(&self) -> QueueResult<Vec<u8>> {
        let body = self.encode_body()?;

        let mut data = Vec::with_capacity(HEADER_SIZE + body.len() + CRC_SIZE);
        data.extend_from_slice(&JOURNAL_MAGIC);
        data.extend_from_slice(&JOURNAL_VERSION.to_le_bytes());
        data.push(self.type_code());
        data.extend_from_slice(&(body.len() as u32).to_le_bytes());
        data.extend_from_slice(&body);

        let crc = compute_crc32(&data);
        data.extend_from_slice(&crc.to_le_bytes());

        Ok(data)
    }
}

/// Parses one framed record starting at the beginning of `bytes`.
///
/// Returns the record and the total frame length, or `None` if the
/// frame is incomplete, corrupt, or of an unknown version.
pub fn decode_frame(bytes: &[u8]) -> Option<(JournalRecord, usize)> {
    if bytes.len() < HEADER_SIZE {
        return None;
    }
    if bytes[0..4] != JOURNAL_MAGIC {
        return None;
    }
    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != JOURNAL_VERSION {
        return None;
    }
    let type_code = bytes[6];
    let body_len = u32::from_le_bytes([bytes[7], bytes[8], bytes[9], bytes[10]]) as usize;

    let frame_len = HEADER_SIZE + body_len + CRC_SIZE;
    if bytes.len() < frame_len {
        return None;
    }

    let crc_offset = HEADER_SIZE + body_len;
    let stored_crc = u32::from_le_bytes([
        bytes[crc_offset],
        bytes[crc_offset + 1],
        bytes[crc_offset + 2],
        bytes[crc_offset + 3],
    ]);
    if compute_crc32(&bytes[..crc_offset]) != stored_crc {
        return None;
    }

    let record = JournalRecord::decode_body(type_code, &bytes[HEADER_SIZE..crc_offset])?;
    Some((record, frame_len))
}

/// Computes a CRC32 checksum (IEEE polynomial).
pub fn compute_crc32(data: &[u8]) -> u32 {
    const CRC32_TABLE: [u32; 256] = {
        let mut table = [0u32; 256];
        let mut i = 0;
        while i < 256 {
            let mut crc = i as u32;
            let mut j = 0;
            while j < 8 {
                if crc & 1 != 0 {
                    crc = (crc >> 1) ^ 0xEDB8_8320;
                } else {
                    crc >>= 1;
                }
                j += 1;
            }
            table[i] = crc;
            i += 1;
        }
        table
    };

    let mut crc = 0xFFFF_FFFF_u32;
    for &byte in data {
        let index = ((crc ^ u32::from(byte)) & 0xFF) as usize;
        crc = (crc >> 8) ^ CRC32_TABLE[index];
    }
    !crc
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldsync_protocol::{EntityKind, RowData};
    use serde_json::json;

    fn sample_item(id: u64) -> QueueItem {
        let mut payload = RowData::new();
        payload.insert("uuid".into(), json!(format!("u-{id}")));
        QueueItem::new(id, EntityKind::Session, "capture_sessions", payload, 2)
    }

    #[test]
    fn upsert_frame_roundtrip() {
        let record = JournalRecord::Upsert(Box::new(sample_item(3)));
        let frame = record.encode_frame().unwrap();

        let (decoded, len) = decode_frame(&frame).unwrap();
        assert_eq!(len, frame.len());
        assert_eq!(decoded, record);
    }

    #[test]
    fn remove_frame_roundtrip() {
        let record = JournalRecord::Remove(99);
        let frame = record.encode_frame().unwrap();

        let (decoded, len) = decode_frame(&frame).unwrap();
        assert_eq!(len, frame.len());
        assert_eq!(decoded, JournalRecord::Remove(99));
    }

    #[test]
    fn truncated_frame_rejected() {
        let record = JournalRecord::Remove(1);
        let frame = record.encode_frame().unwrap();

        assert!(decode_frame(&frame[..frame.len() - 1]).is_none());
        assert!(decode_frame(&frame[..HEADER_SIZE - 2]).is_none());
    }

    #[test]
    fn corrupt_body_rejected() {
        let record = JournalRecord::Upsert(Box::new(sample_item(1)));
        let mut frame = record.encode_frame().unwrap();
        frame[HEADER_SIZE + 2] ^= 0xFF;

        assert!(decode_frame(&frame).is_none());
    }

    #[test]
    fn wrong_magic_rejected() {
        let record = JournalRecord::Remove(1);
        let mut frame = record.encode_frame().unwrap();
        frame[0] = b'X';

        assert!(decode_frame(&frame).is_none());
    }

    #[test]
    fn crc32_known_vector() {
        assert_eq!(compute_crc32(b"123456789"), 0xCBF4_3926);
        assert_eq!(compute_crc32(b""), 0x0000_0000);
    }
}
