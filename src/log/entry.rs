//! Log entry codec
//!
//! Converts a key-value pair to and from its one-line on-disk form.

use crate::error::{Result, SaaviError};

/// Separates key from value inside a record
pub const SEPARATOR: char = ',';

/// Terminates every record
pub const NEWLINE: char = '\n';

/// Value written by Delete
pub const TOMBSTONE: &str = "";

/// A decoded log record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: String,
}

impl Entry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Whether this record marks its key as deleted
    pub fn is_tombstone(&self) -> bool {
        self.value == TOMBSTONE
    }
}

/// Keys are non-empty and ASCII alphanumeric, so they never contain the separator
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Fail with `InvalidKey` unless `key` is usable
pub fn validate_key(key: &str) -> Result<()> {
    if is_valid_key(key) {
        Ok(())
    } else {
        Err(SaaviError::InvalidKey(key.to_string()))
    }
}

/// Fail with `InvalidValue` if `value` would split the record across lines
///
/// Only `\n` terminates a record; a carriage return is stored verbatim.
pub fn validate_value(key: &str, value: &str) -> Result<()> {
    if value.contains(NEWLINE) {
        return Err(SaaviError::InvalidValue(key.to_string()));
    }
    Ok(())
}

/// Encode a key-value pair as `key,value\n`
///
/// The key is validated before anything is built. The value is written
/// verbatim: commas survive because decoding splits on the first one only.
pub fn encode(key: &str, value: &str) -> Result<String> {
    validate_key(key)?;

    let mut record = String::with_capacity(key.len() + value.len() + 2);
    record.push_str(key);
    record.push(SEPARATOR);
    record.push_str(value);
    record.push(NEWLINE);
    Ok(record)
}

/// Decode one record (without its trailing newline)
///
/// `offset` is only used to report where a malformed record sits.
pub fn decode(record: &str, offset: u64) -> Result<Entry> {
    match record.split_once(SEPARATOR) {
        Some((key, value)) => Ok(Entry::new(key, value)),
        None => Err(SaaviError::MalformedRecord {
            offset,
            record: record.to_string(),
        }),
    }
}
