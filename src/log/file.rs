//! Log file handle
//!
//! Owns the single read/append handle on the log. Every operation positions
//! the cursor explicitly, so a scan that left it anywhere cannot affect the
//! next append or lookup.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::config::SyncStrategy;
use crate::error::{Result, SaaviError};

use super::entry::NEWLINE;
use super::scanner::{ReverseCursor, Scan, ScanMode};

/// The append-only log backing an engine
pub struct LogFile {
    path: PathBuf,
    reader: BufReader<File>,
    sync_strategy: SyncStrategy,
}

impl LogFile {
    /// Open the log for read/append, creating it if absent
    pub fn open(path: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)
            .map_err(|source| SaaviError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            sync_strategy,
        })
    }

    /// Append an encoded record and return the offset it starts at
    pub fn append(&mut self, record: &str) -> Result<u64> {
        // Seeking the BufReader also drops whatever it had buffered
        let offset = self.reader.seek(SeekFrom::End(0))?;

        let file = self.reader.get_mut();
        file.write_all(record.as_bytes())?;
        file.flush()?;
        if self.sync_strategy == SyncStrategy::EveryWrite {
            file.sync_data()?;
        }

        Ok(offset)
    }

    /// Read the single line starting at `offset`, without its newline
    pub fn read_line_at(&mut self, offset: u64) -> Result<String> {
        self.reader.seek(SeekFrom::Start(offset))?;

        let mut buf = Vec::new();
        self.reader.read_until(NEWLINE as u8, &mut buf)?;
        if buf.last() == Some(&(NEWLINE as u8)) {
            buf.pop();
        }

        String::from_utf8(buf).map_err(|e| SaaviError::MalformedRecord {
            offset,
            record: String::from_utf8_lossy(e.as_bytes()).into_owned(),
        })
    }

    /// Current size of the log in bytes
    pub fn size(&mut self) -> Result<u64> {
        Ok(self.reader.seek(SeekFrom::End(0))?)
    }

    /// Start a fresh reverse scan over the whole log
    pub fn scan(&mut self, mode: ScanMode) -> Result<Scan<'_, BufReader<File>>> {
        let cursor = ReverseCursor::new(&mut self.reader, mode)?;
        Ok(Scan::new(cursor, &mut self.reader))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
