//! Configuration for minikv
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{KvError, Result};

/// Main configuration for a minikv instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding the data files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── minikvdb.data         (append-only log)
    ///     └── minikvdb.data.merge   (only present while a merge runs)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// fsync the log after every append
    pub sync_on_write: bool,

    /// fsync the merged log before it replaces the primary file
    pub sync_on_merge: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./minikv_data"),
            sync_on_write: false,
            sync_on_merge: true,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the config before an engine is opened with it
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(KvError::Config("data_dir must not be empty".to_string()));
        }
        Ok(())
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

    /// fsync after every append (safest, slowest)
    pub fn sync_on_write(mut self, enabled: bool) -> Self {
        self.config.sync_on_write = enabled;
        self
    }

    /// fsync the merged file before swapping it in
    pub fn sync_on_merge(mut self, enabled: bool) -> Self {
        self.config.sync_on_merge = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
