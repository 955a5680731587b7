//! Configuration for Saavi
//!
//! Centralized configuration with sensible defaults.

use std::path::{Path, PathBuf};

/// Main configuration for a Saavi instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory that relative db file names are resolved against
    pub data_dir: PathBuf,

    /// How hard each Put pushes its record towards the disk
    pub sync_strategy: SyncStrategy,
}

/// Log sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncStrategy {
    /// Flush user-space buffers after every write
    #[default]
    Flush,

    /// fsync after every write (safest, slowest)
    EveryWrite,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: std::env::temp_dir(),
            sync_strategy: SyncStrategy::default(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Resolve a db file name: absolute paths are kept, relative ones are
    /// placed under `data_dir`.
    pub fn resolve(&self, name: impl AsRef<Path>) -> PathBuf {
        let name = name.as_ref();
        if name.is_absolute() {
            name.to_path_buf()
        } else {
            self.data_dir.join(name)
        }
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
