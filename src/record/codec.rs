//! Record codec
//!
//! Encoding and decoding functions for log records. All header fields are
//! big-endian.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{KvError, Result};

use super::{Marker, Record, RecordHeader, HEADER_SIZE};

/// On-disk size of a record with the given field lengths
pub fn record_size(key_size: u32, value_size: u32) -> u64 {
    HEADER_SIZE as u64 + key_size as u64 + value_size as u64
}

/// Encode a record to bytes
///
/// Format: key_size (4) + value_size (4) + marker (2) + key + value
pub fn encode(record: &Record) -> Result<Bytes> {
    let key = record.key();
    let value = record.value().unwrap_or(&[]);

    let key_size = size_field(key.len(), "key")?;
    let value_size = size_field(value.len(), "value")?;

    let mut buf = BytesMut::with_capacity(record_size(key_size, value_size) as usize);
    buf.put_u32(key_size);
    buf.put_u32(value_size);
    buf.put_u16(record.marker() as u16);
    buf.put_slice(key);
    buf.put_slice(value);

    Ok(buf.freeze())
}

/// Decode the fixed-width header at the start of `bytes`
///
/// Only the first `HEADER_SIZE` bytes are inspected.
pub fn decode_header(bytes: &[u8]) -> Result<RecordHeader> {
    if bytes.len() < HEADER_SIZE {
        return Err(KvError::Decoding(format!(
            "Incomplete header: expected {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut buf = &bytes[..HEADER_SIZE];
    let key_size = buf.get_u32();
    let value_size = buf.get_u32();
    let marker = Marker::try_from(buf.get_u16())?;

    if marker == Marker::Tombstone && value_size != 0 {
        return Err(KvError::Decoding(format!(
            "Tombstone header declares a {} byte value",
            value_size
        )));
    }

    Ok(RecordHeader {
        key_size,
        value_size,
        marker,
    })
}

/// Build a record from a decoded header and its body fields
pub fn decode_body(header: &RecordHeader, key: Vec<u8>, value: Vec<u8>) -> Result<Record> {
    if key.len() != header.key_size as usize || value.len() != header.value_size as usize {
        return Err(KvError::Decoding(format!(
            "Body length mismatch: header says key={} value={}, got key={} value={}",
            header.key_size,
            header.value_size,
            key.len(),
            value.len()
        )));
    }

    Ok(match header.marker {
        Marker::Put => Record::Put { key, value },
        Marker::Tombstone => Record::Tombstone { key },
    })
}

/// Convert a field length to its 32-bit size field
fn size_field(len: usize, field: &str) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        KvError::Encoding(format!(
            "{} of {} bytes exceeds the maximum of {} bytes",
            field,
            len,
            u32::MAX
        ))
    })
}
