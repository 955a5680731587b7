//! Reply definitions
//!
//! What the shell prints after executing a command.

/// Message printed by `get` for a missing or deleted key
pub const NOT_FOUND_MESSAGE: &str = "Key not found";

/// Message printed by `exit`
pub const EXIT_MESSAGE: &str = "Bye!";

/// Outcome of one executed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Nothing to print
    Empty,

    /// Lines to print, loop continues
    Text(String),

    /// Print and stop the loop
    Exit(String),
}

impl Reply {
    pub fn text(message: impl Into<String>) -> Self {
        Reply::Text(message.into())
    }

    pub fn not_found() -> Self {
        Reply::Text(NOT_FOUND_MESSAGE.to_string())
    }

    pub fn exit() -> Self {
        Reply::Exit(EXIT_MESSAGE.to_string())
    }

    pub fn is_exit(&self) -> bool {
        matches!(self, Reply::Exit(_))
    }
}
