//! Index implementation
//!
//! HashMap-based key → offset table.

use std::collections::HashMap;

/// Key → log offset lookup table
///
/// Offsets are positions in the append log; the index never owns record data.
#[derive(Debug, Default, Clone)]
pub struct Index {
    entries: HashMap<Vec<u8>, u64>,
}

impl Index {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset of the latest record for `key`
    pub fn get(&self, key: &[u8]) -> Option<u64> {
        self.entries.get(key).copied()
    }

    /// Point `key` at `offset`, returning the previous offset
    pub fn insert(&mut self, key: Vec<u8>, offset: u64) -> Option<u64> {
        self.entries.insert(key, offset)
    }

    /// Forget `key`, returning its offset if it was live
    pub fn remove(&mut self, key: &[u8]) -> Option<u64> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.entries.contains_key(key)
    }

    /// True if the live entry for `key` is exactly the record at `offset`
    pub fn points_to(&self, key: &[u8], offset: u64) -> bool {
        self.get(key) == Some(offset)
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
