//! Log Module
//!
//! The single append-only file that holds all state.
//!
//! ## Responsibilities
//! - Encode/decode one key-value mutation per line
//! - Append records and read one back by offset
//! - Reverse traversal for index rebuild and iteration
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────┐
//! │ key1,value1\n               │  offset 0
//! ├─────────────────────────────┤
//! │ key2,value2\n               │  offset 12
//! ├─────────────────────────────┤
//! │ key1,\n                     │  tombstone (empty value)
//! └─────────────────────────────┘
//! ```
//! Keys are ASCII alphanumeric. Values are written verbatim and may contain
//! commas but never a newline.

mod entry;
mod file;
mod scanner;

pub use entry::{
    decode, encode, is_valid_key, validate_key, validate_value, Entry, NEWLINE, SEPARATOR,
    TOMBSTONE,
};
pub use file::LogFile;
pub use scanner::{ReverseCursor, Scan, ScanMode, ScanStats, ScannedRecord};
