//! # Saavi
//!
//! A minimal persistent key-value store with:
//! - A single append-only log file as the only durable state
//! - An in-memory key → offset index for one-seek reads
//! - Index rebuild on open by scanning the log backwards
//! - An interactive shell front end
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Shell                               │
//! │              (open / put / get / delete / list)              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                         Engine                               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │     Log     │◄─────────│  KeyIndex   │
//!   │  (Append)   │ offsets  │  (HashMap)  │
//!   └─────────────┘          └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use saavi::Engine;
//!
//! let mut engine = Engine::open("/tmp/example.db")?;
//! engine.put("greeting", "hello")?;
//! assert_eq!(engine.get("greeting")?, Some("hello".to_string()));
//! engine.delete("greeting")?;
//! assert_eq!(engine.get("greeting")?, None);
//! # Ok::<(), saavi::SaaviError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod log;
pub mod index;
pub mod engine;
pub mod shell;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{SaaviError, Result};
pub use config::{Config, SyncStrategy};
pub use engine::Engine;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of Saavi
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
