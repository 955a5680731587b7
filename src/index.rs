//! Key index
//!
//! Maps each key to the offset of its most recent record in the log.
//!
//! The index is a pure cache of the log: it is never persisted and is rebuilt
//! from a reverse scan on every open. There is no removal; a deleted key
//! either points at its tombstone record (same session) or is absent (after
//! a rebuild).

use std::collections::HashMap;

/// In-memory key → offset map
#[derive(Debug, Default)]
pub struct KeyIndex {
    offsets: HashMap<String, u64>,
}

impl KeyIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Point `key` at `offset`, replacing any previous offset
    pub fn put(&mut self, key: String, offset: u64) {
        self.offsets.insert(key, offset);
    }

    /// Offset of the newest record for `key`, if it was ever indexed
    pub fn get(&self, key: &str) -> Option<u64> {
        self.offsets.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.offsets.contains_key(key)
    }

    /// Number of indexed keys (tombstones written this session included)
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}
