//! Saavi Shell Binary
//!
//! Starts the interactive shell on stdin/stdout.

use std::io;
use std::path::PathBuf;

use clap::Parser;
use saavi::shell::Shell;
use saavi::{Config, SyncStrategy};
use tracing_subscriber::{fmt, EnvFilter};

/// Saavi Shell
#[derive(Parser, Debug)]
#[command(name = "saavi")]
#[command(about = "Minimal persistent key-value store backed by an append-only log")]
#[command(version)]
struct Args {
    /// Data directory that relative db file names are resolved against
    data_dir: Option<PathBuf>,

    /// fsync every write instead of only flushing it
    #[arg(long)]
    sync: bool,
}

fn main() {
    // Logs go to stderr so they never interleave with shell output
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut builder = Config::builder();
    if let Some(dir) = args.data_dir {
        builder = builder.data_dir(dir);
    }
    if args.sync {
        builder = builder.sync_strategy(SyncStrategy::EveryWrite);
    }
    let config = builder.build();

    tracing::info!("Saavi v{}", saavi::VERSION);
    tracing::info!("Data directory: {}", config.data_dir.display());

    let mut shell = match Shell::new(config) {
        Ok(shell) => shell,
        Err(e) => {
            tracing::error!("Failed to start shell: {}", e);
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = shell.run(io::stdin().lock(), io::stdout().lock()) {
        tracing::error!("Shell error: {}", e);
        std::process::exit(1);
    }
}
