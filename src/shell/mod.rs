//! Shell Module
//!
//! Line-oriented interactive front end over one engine.
//!
//! ## Commands
//! ```text
//! open <path>          open/create a db file (relative to data dir)
//! put <key> <value>    write a value
//! get <key>            print the value or "Key not found"
//! delete <key>         delete a key
//! list                 print live key,value pairs, newest first
//! exit                 leave the shell
//! ```
//! Command names are case-insensitive; arguments are separated by whitespace.

mod command;
mod reply;
mod session;

pub use command::{lookup, parse_line, CommandSpec, Invocation, Op, COMMANDS};
pub use reply::{Reply, EXIT_MESSAGE, NOT_FOUND_MESSAGE};
pub use session::{Shell, PROMPT};
