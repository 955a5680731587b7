//! Shell session
//!
//! Holds the optional open engine and runs the read-eval-print loop.

use std::io::{BufRead, Write};

use tracing::{debug, info};

use crate::config::Config;
use crate::engine::Engine;
use crate::error::{Result, SaaviError};

use super::command::{parse_line, Invocation, Op};
use super::reply::Reply;

/// Prompt printed before every input line
pub const PROMPT: &str = "saavi=> ";

/// An interactive session over at most one open engine
pub struct Shell {
    config: Config,
    engine: Option<Engine>,
}

impl Shell {
    /// Create a shell; the configured data directory must exist
    pub fn new(config: Config) -> Result<Self> {
        if !config.data_dir.is_dir() {
            return Err(SaaviError::DataDir(config.data_dir));
        }
        Ok(Self {
            config,
            engine: None,
        })
    }

    /// The engine opened by the last successful `open`, if any
    pub fn engine_mut(&mut self) -> Option<&mut Engine> {
        self.engine.as_mut()
    }

    /// Parse and execute one input line
    pub fn execute(&mut self, line: &str) -> Result<Reply> {
        match parse_line(line)? {
            Some(invocation) => self.dispatch(invocation),
            None => Ok(Reply::Empty),
        }
    }

    fn dispatch(&mut self, invocation: Invocation) -> Result<Reply> {
        let Invocation { spec, args } = invocation;

        if spec.requires_open && self.engine.is_none() {
            return Err(SaaviError::NotOpen(spec.name.to_string()));
        }

        match spec.op {
            Op::Open => self.open(&args[0]),
            Op::Put => {
                self.open_engine(spec.name)?.put(&args[0], &args[1])?;
                Ok(Reply::Empty)
            }
            Op::Get => match self.open_engine(spec.name)?.get(&args[0])? {
                Some(value) => Ok(Reply::Text(value)),
                None => Ok(Reply::not_found()),
            },
            Op::Delete => {
                self.open_engine(spec.name)?.delete(&args[0])?;
                Ok(Reply::Empty)
            }
            Op::List => {
                let mut lines = Vec::new();
                for record in self.open_engine(spec.name)?.iter()? {
                    let record = record?;
                    lines.push(format!("{},{}", record.entry.key, record.entry.value));
                }
                if lines.is_empty() {
                    Ok(Reply::Empty)
                } else {
                    Ok(Reply::Text(lines.join("\n")))
                }
            }
            Op::Exit => Ok(Reply::exit()),
        }
    }

    /// Open (or reopen) a db file, replacing any engine already open
    fn open(&mut self, name: &str) -> Result<Reply> {
        let path = self.config.resolve(name);
        let engine = Engine::open_with_config(&path, &self.config)?;
        info!(path = %path.display(), keys = engine.len(), "opened db file");
        self.engine = Some(engine);
        Ok(Reply::Empty)
    }

    fn open_engine(&mut self, command: &str) -> Result<&mut Engine> {
        self.engine
            .as_mut()
            .ok_or_else(|| SaaviError::NotOpen(command.to_string()))
    }

    /// Run the loop until `exit` or end of input
    ///
    /// Command errors are printed and the loop continues; only failures
    /// writing to `output` end it early.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut output: W) -> Result<()> {
        let mut line = String::new();

        loop {
            write!(output, "{}", PROMPT)?;
            output.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                debug!("end of input");
                writeln!(output)?;
                return Ok(());
            }

            match self.execute(line.trim_end_matches(['\n', '\r'])) {
                Ok(Reply::Empty) => {}
                Ok(Reply::Text(text)) => writeln!(output, "{}", text)?,
                Ok(Reply::Exit(text)) => {
                    writeln!(output, "{}", text)?;
                    return Ok(());
                }
                Err(e) => {
                    debug!(error = %e, "command failed");
                    writeln!(output, "{}", e)?;
                }
            }
        }
    }
}
