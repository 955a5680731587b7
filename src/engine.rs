//! Engine Module
//!
//! The storage engine that ties the log file and the key index together.
//!
//! ## Responsibilities
//! - Open/create the log and rebuild the index from it
//! - Validate keys and values before any I/O
//! - Append records and keep the index pointing at the newest one
//! - Expose the current snapshot as a newest-first iteration

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::{debug, trace};

use crate::config::Config;
use crate::error::{Result, SaaviError};
use crate::index::KeyIndex;
use crate::log::{self, LogFile, Scan, ScanMode, ScanStats, TOMBSTONE};

/// A reverse scan over an engine's log
pub type LogScan<'a> = Scan<'a, BufReader<File>>;

/// The main storage engine
///
/// ## Concurrency Model
///
/// Single-threaded. Every operation takes `&mut self` and performs a blocking
/// seek/read/write sequence on the one file handle the engine owns. Opening
/// the same file from two engines at once is unsupported.
pub struct Engine {
    /// Append-only log (authoritative state)
    log: LogFile,

    /// Key → offset of newest record
    index: KeyIndex,

    /// What the rebuild at open saw
    rebuild_stats: ScanStats,
}

impl Engine {
    /// Open or create the log at `path` with default config
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, &Config::default())
    }

    /// Open or create the log at `path`
    ///
    /// On startup:
    /// 1. Open the file for read/append, creating it if absent
    /// 2. Reverse-scan the log, keeping only the newest live record per key
    /// 3. Index every key produced by the scan
    ///
    /// A malformed record anywhere in the log fails the open.
    pub fn open_with_config(path: impl AsRef<Path>, config: &Config) -> Result<Self> {
        let path = path.as_ref();
        let mut log = LogFile::open(path, config.sync_strategy)?;

        let mut index = KeyIndex::new();
        let rebuild_stats = {
            let mut scan = log.scan(ScanMode::Dedup)?;
            for record in scan.by_ref() {
                let record = record?;
                index.put(record.entry.key, record.offset);
            }
            scan.stats()
        };

        debug!(
            path = %path.display(),
            records = rebuild_stats.records_scanned,
            live_keys = index.len(),
            tombstones = rebuild_stats.tombstones,
            shadowed = rebuild_stats.shadowed,
            "rebuilt index from log"
        );

        Ok(Self {
            log,
            index,
            rebuild_stats,
        })
    }

    /// Put a key-value pair
    ///
    /// Steps:
    /// 1. Validate key and value (no I/O on failure)
    /// 2. Append the record at end of file and flush
    /// 3. Point the index at the new record
    pub fn put(&mut self, key: &str, value: &str) -> Result<()> {
        log::validate_key(key)?;
        log::validate_value(key, value)?;
        let record = log::encode(key, value)?;

        let offset = self.log.append(&record)?;
        self.index.put(key.to_string(), offset);

        trace!(key, offset, tombstone = value.is_empty(), "appended record");
        Ok(())
    }

    /// Get the current value of a key
    ///
    /// Returns `Ok(None)` both for keys never written and for deleted keys.
    pub fn get(&mut self, key: &str) -> Result<Option<String>> {
        log::validate_key(key)?;

        let Some(offset) = self.index.get(key) else {
            trace!(key, "index miss");
            return Ok(None);
        };

        let line = self.log.read_line_at(offset)?;
        let entry = log::decode(&line, offset)?;
        if entry.key != key {
            return Err(SaaviError::IndexCorruption {
                key: key.to_string(),
                offset,
                found: entry.key,
            });
        }

        trace!(key, offset, "index hit");
        if entry.is_tombstone() {
            Ok(None)
        } else {
            Ok(Some(entry.value))
        }
    }

    /// Delete a key by appending a tombstone
    pub fn delete(&mut self, key: &str) -> Result<()> {
        self.put(key, TOMBSTONE)
    }

    /// Live entries, newest first, each key once
    ///
    /// Every call starts a fresh scan. Dropping or draining it leaves the
    /// engine usable: appends and lookups reposition the file themselves.
    pub fn iter(&mut self) -> Result<LogScan<'_>> {
        self.log.scan(ScanMode::Dedup)
    }

    /// Every physical record, newest first, tombstones and shadowed records included
    pub fn records(&mut self) -> Result<LogScan<'_>> {
        self.log.scan(ScanMode::Raw)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Path of the log file
    pub fn path(&self) -> &Path {
        self.log.path()
    }

    /// Number of indexed keys
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Size of the log in bytes
    pub fn log_size(&mut self) -> Result<u64> {
        self.log.size()
    }

    /// Counters from the index rebuild performed at open
    pub fn rebuild_stats(&self) -> ScanStats {
        self.rebuild_stats
    }
}
