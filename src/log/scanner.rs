//! Reverse log scanner
//!
//! Walks the log from the newest record back to the oldest using byte
//! offsets only. The walk state lives in [`ReverseCursor`]: the exclusive end
//! of the next record to read, a window of not-yet-consumed bytes ending
//! there, and the set of keys already produced. Each byte of the log is read
//! from the file once. A cursor is single-pass; start a new one for every
//! traversal.
//!
//! ```text
//!   offset 0                                             EOF
//!   │ k1,a\n │ k2,b\n │ k1,\n │ k3,c\n │ k2,d\n │
//!   ◄──────────────────────────────────────────── read direction
//!
//!   Dedup:  (k2,d) (k3,c)          k1 tombstoned, older k2 shadowed
//!   Raw:    (k2,d) (k3,c) (k1,) (k2,b) (k1,a)
//! ```

use std::collections::HashSet;
use std::io::{Read, Seek, SeekFrom};

use tracing::warn;

use crate::error::{Result, SaaviError};

use super::entry::{self, Entry, NEWLINE};

/// Minimum size of one backward read
const SCAN_CHUNK_SIZE: usize = 8 * 1024;

/// Which records a scan produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Newest record per key only; tombstoned keys are suppressed entirely
    Dedup,

    /// Every physical record
    Raw,
}

/// A record produced by a scan, together with where it starts in the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedRecord {
    pub offset: u64,
    pub entry: Entry,
}

/// Counters accumulated while scanning
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Physical records read
    pub records_scanned: u64,

    /// Records dropped because a newer one for the same key came first
    pub shadowed: u64,

    /// Newest-per-key records that were tombstones
    pub tombstones: u64,
}

/// Explicit state of one reverse traversal
#[derive(Debug)]
pub struct ReverseCursor {
    mode: ScanMode,
    /// Exclusive end of the next record; `None` once the start of the log is passed
    end: Option<u64>,
    /// Bytes `[window_start, end)` read from the log but not yet consumed
    window: Vec<u8>,
    window_start: u64,
    seen: HashSet<String>,
    stats: ScanStats,
}

impl ReverseCursor {
    /// Position a new cursor at the end of the log, skipping its final newline
    pub fn new<R: Read + Seek>(reader: &mut R, mode: ScanMode) -> Result<Self> {
        let len = reader.seek(SeekFrom::End(0))?;

        let mut end = len;
        if len > 0 {
            reader.seek(SeekFrom::Start(len - 1))?;
            let mut last = [0u8; 1];
            reader.read_exact(&mut last)?;
            if last[0] == NEWLINE as u8 {
                end -= 1;
            } else {
                warn!(len, "log does not end with a newline, last record may be torn");
            }
        }

        Ok(Self {
            mode,
            end: (end > 0).then_some(end),
            window: Vec::new(),
            window_start: end,
            seen: HashSet::new(),
            stats: ScanStats::default(),
        })
    }

    /// Move to the next record this cursor's mode produces
    ///
    /// Returns `Ok(None)` once the start of the log has been passed. After an
    /// error the cursor is exhausted.
    pub fn advance<R: Read + Seek>(&mut self, reader: &mut R) -> Result<Option<ScannedRecord>> {
        let result = self.step(reader);
        if result.is_err() {
            self.end = None;
        }
        result
    }

    fn step<R: Read + Seek>(&mut self, reader: &mut R) -> Result<Option<ScannedRecord>> {
        while self.end.is_some() {
            let (start, bytes) = self.take_record(reader)?;

            // The byte before `start` is the previous record's newline
            self.end = if start == 0 { None } else { Some(start - 1) };
            self.stats.records_scanned += 1;

            let record = record_to_string(bytes, start)?;
            let entry = entry::decode(&record, start)?;

            if self.mode == ScanMode::Raw {
                return Ok(Some(ScannedRecord { offset: start, entry }));
            }

            if !self.seen.insert(entry.key.clone()) {
                self.stats.shadowed += 1;
                continue;
            }

            if entry.is_tombstone() {
                self.stats.tombstones += 1;
                continue;
            }

            return Ok(Some(ScannedRecord { offset: start, entry }));
        }

        Ok(None)
    }

    /// Split the last record off the window, reading further back as needed
    ///
    /// Leaves the window ending just before the consumed record's leading
    /// newline, i.e. at the next record's exclusive end.
    fn take_record<R: Read + Seek>(&mut self, reader: &mut R) -> Result<(u64, Vec<u8>)> {
        let mut searched = 0;
        loop {
            let unsearched = self.window.len() - searched;
            if let Some(i) = self.window[..unsearched]
                .iter()
                .rposition(|&b| b == NEWLINE as u8)
            {
                let record = self.window.split_off(i + 1);
                self.window.truncate(i);
                return Ok((self.window_start + i as u64 + 1, record));
            }

            if self.window_start == 0 {
                return Ok((0, std::mem::take(&mut self.window)));
            }

            searched = self.window.len();
            self.extend_backwards(reader)?;
        }
    }

    /// Prepend the bytes before `window_start` to the window
    ///
    /// Reads at least one chunk and at least as much as the window already
    /// holds, so a record spanning many chunks is copied a logarithmic number
    /// of times.
    fn extend_backwards<R: Read + Seek>(&mut self, reader: &mut R) -> Result<()> {
        let want = SCAN_CHUNK_SIZE.max(self.window.len()) as u64;
        let chunk_start = self.window_start.saturating_sub(want);

        let mut chunk = vec![0u8; (self.window_start - chunk_start) as usize];
        reader.seek(SeekFrom::Start(chunk_start))?;
        reader.read_exact(&mut chunk)?;

        chunk.extend_from_slice(&self.window);
        self.window = chunk;
        self.window_start = chunk_start;
        Ok(())
    }

    pub fn is_exhausted(&self) -> bool {
        self.end.is_none()
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }
}

fn record_to_string(bytes: Vec<u8>, offset: u64) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| SaaviError::MalformedRecord {
        offset,
        record: String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

/// Iterator adapter pairing a cursor with the reader it walks
pub struct Scan<'a, R> {
    cursor: ReverseCursor,
    reader: &'a mut R,
}

impl<'a, R: Read + Seek> Scan<'a, R> {
    pub fn new(cursor: ReverseCursor, reader: &'a mut R) -> Self {
        Self { cursor, reader }
    }

    /// Counters so far; complete once the scan is drained
    pub fn stats(&self) -> ScanStats {
        self.cursor.stats()
    }
}

impl<'a, R: Read + Seek> Iterator for Scan<'a, R> {
    type Item = Result<ScannedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.advance(&mut *self.reader).transpose()
    }
}
