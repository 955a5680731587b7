//! Command definitions
//!
//! The shell's dispatch table: command name → descriptor.

use crate::error::{Result, SaaviError};

/// Operation a command dispatches to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Open,
    Put,
    Get,
    Delete,
    List,
    Exit,
}

/// Descriptor for one supported command
#[derive(Debug)]
pub struct CommandSpec {
    /// Lower-case name typed by the user
    pub name: &'static str,

    /// Exact number of arguments
    pub arity: usize,

    /// Whether a db file must be open first
    pub requires_open: bool,

    /// Syntax shown in arity errors
    pub syntax: &'static str,

    /// Extra line shown under the syntax, may be empty
    pub note: &'static str,

    pub op: Op,
}

impl CommandSpec {
    /// Usage text for error messages
    pub fn usage(&self) -> String {
        if self.note.is_empty() {
            self.syntax.to_string()
        } else {
            format!("{}\n      {}", self.syntax, self.note)
        }
    }
}

const KEY_NOTE: &str = "'key' can only be alphanumeric";

/// All supported commands
pub static COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "open",
        arity: 1,
        requires_open: false,
        syntax: "open <path/to/file/name>",
        note: "'path' can be either absolute or relative to datadir",
        op: Op::Open,
    },
    CommandSpec {
        name: "put",
        arity: 2,
        requires_open: true,
        syntax: "put <key> <value>",
        note: KEY_NOTE,
        op: Op::Put,
    },
    CommandSpec {
        name: "get",
        arity: 1,
        requires_open: true,
        syntax: "get <key>",
        note: KEY_NOTE,
        op: Op::Get,
    },
    CommandSpec {
        name: "delete",
        arity: 1,
        requires_open: true,
        syntax: "delete <key>",
        note: KEY_NOTE,
        op: Op::Delete,
    },
    CommandSpec {
        name: "list",
        arity: 0,
        requires_open: true,
        syntax: "list",
        note: "",
        op: Op::List,
    },
    CommandSpec {
        name: "exit",
        arity: 0,
        requires_open: false,
        syntax: "exit",
        note: "",
        op: Op::Exit,
    },
];

/// Find a command by name (case-insensitive)
pub fn lookup(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS
        .iter()
        .find(|spec| spec.name.eq_ignore_ascii_case(name))
}

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub spec: &'static CommandSpec,
    pub args: Vec<String>,
}

// Command names are unique within the table
impl PartialEq for CommandSpec {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for CommandSpec {}

/// Parse one input line
///
/// Returns `Ok(None)` for a blank line. Checks the command name and the
/// argument count; whether a db is open is checked at dispatch.
pub fn parse_line(line: &str) -> Result<Option<Invocation>> {
    let mut tokens = line.split_whitespace();
    let Some(name) = tokens.next() else {
        return Ok(None);
    };

    let spec = lookup(name).ok_or_else(|| SaaviError::UnsupportedCommand(name.to_string()))?;
    let args: Vec<String> = tokens.map(str::to_string).collect();

    if args.len() != spec.arity {
        return Err(SaaviError::WrongArity {
            command: spec.name.to_string(),
            usage: spec.usage(),
        });
    }

    Ok(Some(Invocation { spec, args }))
}
