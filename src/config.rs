//! Replay configuration
//!
//! Loaded from TOML; every key is optional and falls back to its default.
//! `brw-stats` reads the replay keys and `setattr` reads `[principal]`.
//!
//! ```toml
//! blocks_per_page = 4
//! workers = 8
//! format = "json"
//!
//! [principal]
//! uid = 1000
//! gid = 1000
//! groups = [10, 50]
//! override_capability = false
//! ```

use crate::cli::OutputFormat;
use crate::translate::Principal;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Upper bound on replay worker threads
pub const MAX_WORKERS: usize = 64;

/// Upper bound on blocks per page (a 2 MiB page of 512-byte blocks)
pub const MAX_BLOCKS_PER_PAGE: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Blocks backing each page of a write; used to size the block scan
    pub blocks_per_page: usize,

    /// Worker threads tallying concurrently into one set of histograms
    pub workers: usize,

    /// Report output format
    pub format: OutputFormat,

    /// Principal used when applying set-attributes requests
    pub principal: Principal,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            blocks_per_page: 1,
            workers: 1,
            format: OutputFormat::Text,
            principal: Principal::default(),
        }
    }
}

impl ReplayConfig {
    /// Load and validate a TOML configuration file
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file: {}", path.as_ref().display())
        })?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ReplayConfig =
            toml::from_str(content).context("Failed to parse TOML replay configuration")?;
        if let Err(msg) = config.validate() {
            anyhow::bail!(msg);
        }
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_BLOCKS_PER_PAGE).contains(&self.blocks_per_page) {
            return Err(format!(
                "blocks_per_page must be in [1, {}], got {}",
                MAX_BLOCKS_PER_PAGE, self.blocks_per_page
            ));
        }

        if !(1..=MAX_WORKERS).contains(&self.workers) {
            return Err(format!(
                "workers must be in [1, {}], got {}",
                MAX_WORKERS, self.workers
            ));
        }

        Ok(())
    }
}
