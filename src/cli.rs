//! CLI argument parsing for attrsync

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text format (default)
    #[default]
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "attrsync")]
#[command(version)]
#[command(about = "Masked object attributes and bulk I/O contiguity statistics", long_about = None)]
pub struct Cli {
    /// Enable debug tracing output to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a JSON-lines bulk I/O trace and print the contiguity report
    BrwStats {
        /// Trace file, one {"op":"write"|"read",...} record per line
        #[arg(value_name = "TRACE")]
        trace: PathBuf,

        /// TOML replay configuration
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Number of worker threads tallying concurrently
        #[arg(short = 'j', long, value_name = "N")]
        workers: Option<usize>,

        /// Blocks backing each page of a write
        #[arg(long = "blocks-per-page", value_name = "N")]
        blocks_per_page: Option<usize>,

        /// Output format (text or json)
        #[arg(long = "format", value_enum)]
        format: Option<OutputFormat>,
    },

    /// Merge the masked, valid fields of SRC into DST and print the result
    Merge {
        #[arg(value_name = "DST")]
        dst: PathBuf,
        #[arg(value_name = "SRC")]
        src: PathBuf,
        /// Attribute mask expression (e.g. "times,size" or "all")
        #[arg(short = 'm', long, default_value = "all")]
        mask: String,
    },

    /// Report whether any masked attribute differs between A and B
    Compare {
        #[arg(value_name = "A")]
        a: PathBuf,
        #[arg(value_name = "B")]
        b: PathBuf,
        /// Attribute mask expression (e.g. "mode,uid,gid" or "all")
        #[arg(short = 'm', long, default_value = "all")]
        mask: String,
        /// Also compare the inline buffers
        #[arg(long)]
        inline: bool,
    },

    /// Apply a set-attributes request to an object on behalf of a principal
    Setattr {
        /// Object attributes (JSON)
        #[arg(value_name = "OBJECT")]
        object: PathBuf,
        /// Set-attributes request (JSON)
        #[arg(value_name = "REQUEST")]
        request: PathBuf,
        /// TOML configuration supplying the acting principal
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Acting user id (default 0)
        #[arg(long)]
        uid: Option<u32>,
        /// Acting group id (default 0)
        #[arg(long)]
        gid: Option<u32>,
        /// Supplementary groups, comma separated; replaces the configured list
        #[arg(long, value_delimiter = ',')]
        groups: Vec<u32>,
        /// Principal holds the set-group-ID override capability
        #[arg(long = "override")]
        override_capability: bool,
    },
}
