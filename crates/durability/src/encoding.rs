//! Commit log entry encoding and decoding
//!
//! ## Entry Format
//!
//! ```text
//! [length: u32 LE][type: u8][payload: bytes][crc32: u32 LE]
//! ```
//!
//! - **length**: size of type + payload + crc (not including length itself)
//! - **type**: entry type tag (1 = committed transaction)
//! - **payload**: bincode-serialized `LogEntry`
//! - **crc32**: checksum over `[type][payload]`

use crc32fast::Hasher;

use crate::entry::{LogEntry, TYPE_COMMIT};
use crate::error::{LogError, LogResult};

/// Bytes of the length prefix
const LEN_SIZE: usize = 4;
/// Smallest valid `length` value: type(1) + crc(4)
const MIN_BODY: usize = 1 + 4;

/// Encode an entry into a self-delimiting frame
pub fn encode_entry(entry: &LogEntry) -> LogResult<Vec<u8>> {
    let type_tag = entry.type_tag();
    let payload = bincode::serialize(entry)?;
    let body_len = 1 + payload.len() + 4;

    let mut buf = Vec::with_capacity(LEN_SIZE + body_len);
    buf.extend_from_slice(&(body_len as u32).to_le_bytes());
    buf.push(type_tag);
    buf.extend_from_slice(&payload);
    buf.extend_from_slice(&checksum(type_tag, &payload).to_le_bytes());
    Ok(buf)
}

/// Decode one frame from the start of `buf`
///
/// Returns the entry and the number of bytes consumed. `offset` is the
/// file position of `buf[0]`, used only for error reporting.
///
/// # Errors
///
/// - `LogError::Incomplete` when `buf` ends inside the frame
/// - `LogError::Corruption` on a bad length, checksum, tag or payload
pub fn decode_entry(buf: &[u8], offset: u64) -> LogResult<(LogEntry, usize)> {
    if buf.len() < LEN_SIZE {
        return Err(LogError::Incomplete {
            offset,
            have: buf.len(),
            needed: LEN_SIZE,
        });
    }
    let mut len_bytes = [0u8; LEN_SIZE];
    len_bytes.copy_from_slice(&buf[..LEN_SIZE]);
    let body_len = u32::from_le_bytes(len_bytes) as usize;

    if body_len < MIN_BODY {
        return Err(LogError::Corruption {
            offset,
            reason: format!("invalid entry length {}", body_len),
        });
    }

    let frame_len = LEN_SIZE + body_len;
    if buf.len() < frame_len {
        return Err(LogError::Incomplete {
            offset,
            have: buf.len(),
            needed: frame_len,
        });
    }

    let type_tag = buf[LEN_SIZE];
    let payload = &buf[LEN_SIZE + 1..frame_len - 4];
    let mut crc_bytes = [0u8; 4];
    crc_bytes.copy_from_slice(&buf[frame_len - 4..frame_len]);
    let expected = u32::from_le_bytes(crc_bytes);
    let actual = checksum(type_tag, payload);
    if expected != actual {
        return Err(LogError::Corruption {
            offset,
            reason: format!("CRC mismatch: expected {:08x}, got {:08x}", expected, actual),
        });
    }

    if type_tag != TYPE_COMMIT {
        return Err(LogError::Corruption {
            offset,
            reason: format!("unknown entry type {}", type_tag),
        });
    }

    let entry: LogEntry = bincode::deserialize(payload).map_err(|e| LogError::Corruption {
        offset,
        reason: format!("deserialization failed: {}", e),
    })?;

    Ok((entry, frame_len))
}

fn checksum(type_tag: u8, payload: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[type_tag]);
    hasher.update(payload);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use timekeep_core::{Client, ClientDraft, Entity, EntityKind, Limits, RecordId, RecordKey};

    fn sample_entry() -> LogEntry {
        let now = Utc::now();
        let client = Client::from_draft(
            RecordId::new(),
            &ClientDraft::new("Acme"),
            &Limits::default(),
            now,
            now,
        )
        .unwrap();
        LogEntry::new(
            3,
            9,
            vec![client.into_record()],
            vec![RecordKey::new(EntityKind::Contact, RecordId::new())],
        )
    }

    #[test]
    fn test_decode_consumes_whole_frame() {
        let entry = sample_entry();
        let bytes = encode_entry(&entry).unwrap();
        let (decoded, consumed) = decode_entry(&bytes, 0).unwrap();
        assert_eq!(decoded, entry);
        assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn test_frame_layout() {
        let bytes = encode_entry(&sample_entry()).unwrap();
        let body_len = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        assert_eq!(body_len + 4, bytes.len());
        assert_eq!(bytes[4], TYPE_COMMIT);
    }

    #[test]
    fn test_truncated_frame_is_incomplete() {
        let bytes = encode_entry(&sample_entry()).unwrap();
        for cut in [0, 2, 4, 5, bytes.len() - 1] {
            let err = decode_entry(&bytes[..cut], 100).unwrap_err();
            assert!(
                matches!(err, LogError::Incomplete { offset: 100, .. }),
                "cut at {cut}: {err}"
            );
        }
    }

    #[test]
    fn test_flipped_payload_bit_is_corruption() {
        let mut bytes = encode_entry(&sample_entry()).unwrap();
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0x01;
        let err = decode_entry(&bytes, 0).unwrap_err();
        assert!(matches!(err, LogError::Corruption { .. }));
        assert!(err.is_damage());
    }

    #[test]
    fn test_tiny_length_is_corruption() {
        let bytes = [2u8, 0, 0, 0, 1, 0];
        let err = decode_entry(&bytes, 0).unwrap_err();
        assert!(matches!(err, LogError::Corruption { .. }));
    }

    #[test]
    fn test_unknown_type_is_corruption() {
        let mut bytes = encode_entry(&sample_entry()).unwrap();
        bytes[4] = 0x7F;
        // Recompute the CRC so only the tag check can fail
        let frame_len = bytes.len();
        let crc = checksum(0x7F, &bytes[5..frame_len - 4]);
        bytes[frame_len - 4..].copy_from_slice(&crc.to_le_bytes());
        let err = decode_entry(&bytes, 0).unwrap_err();
        assert!(err.to_string().contains("unknown entry type"));
    }
}
