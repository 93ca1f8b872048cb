//! Record Module
//!
//! The unit persisted to the append-only log.
//!
//! ## Responsibilities
//! - Represent a single Put or Tombstone operation
//! - Fixed-width big-endian header so the format is portable
//! - Exact size arithmetic so scans can step over records without re-reading
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ Record                                                   │
//! │ ┌────────────┬──────────────┬────────────┬─────┬───────┐ │
//! │ │KeySize (4) │ValueSize (4) │ Marker (2) │ Key │ Value │ │
//! │ └────────────┴──────────────┴────────────┴─────┴───────┘ │
//! │   Marker: 0 = Put, 1 = Tombstone (ValueSize always 0)    │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod codec;

pub use codec::{decode_body, decode_header, encode, record_size};

use crate::error::KvError;

/// Header size: KeySize (4) + ValueSize (4) + Marker (2) = 10 bytes
pub const HEADER_SIZE: usize = 10;

/// Operation kind as stored on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Marker {
    Put = 0,
    Tombstone = 1,
}

impl TryFrom<u16> for Marker {
    type Error = KvError;

    fn try_from(raw: u16) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Marker::Put),
            1 => Ok(Marker::Tombstone),
            other => Err(KvError::Decoding(format!("Unknown record marker: {}", other))),
        }
    }
}

/// Decoded fixed-width header of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub key_size: u32,
    pub value_size: u32,
    pub marker: Marker,
}

impl RecordHeader {
    /// Total on-disk size of the record this header introduces
    pub fn record_size(&self) -> u64 {
        record_size(self.key_size, self.value_size)
    }
}

/// A single log record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// Set a key to a value
    Put { key: Vec<u8>, value: Vec<u8> },

    /// Delete a key
    Tombstone { key: Vec<u8> },
}

impl Record {
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Record::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn tombstone(key: impl Into<Vec<u8>>) -> Self {
        Record::Tombstone { key: key.into() }
    }

    pub fn key(&self) -> &[u8] {
        match self {
            Record::Put { key, .. } | Record::Tombstone { key } => key,
        }
    }

    /// The value, or `None` for a tombstone
    pub fn value(&self) -> Option<&[u8]> {
        match self {
            Record::Put { value, .. } => Some(value),
            Record::Tombstone { .. } => None,
        }
    }

    pub fn into_value(self) -> Option<Vec<u8>> {
        match self {
            Record::Put { value, .. } => Some(value),
            Record::Tombstone { .. } => None,
        }
    }

    pub fn marker(&self) -> Marker {
        match self {
            Record::Put { .. } => Marker::Put,
            Record::Tombstone { .. } => Marker::Tombstone,
        }
    }

    /// Exact number of bytes this record occupies in the log
    pub fn encoded_len(&self) -> u64 {
        let value_len = self.value().map_or(0, |v| v.len());
        (HEADER_SIZE + self.key().len() + value_len) as u64
    }
}
