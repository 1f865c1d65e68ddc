//! CLI argument definitions using clap
//!
//! Commands:
//! - aiscorpus info <FILES>...
//! - aiscorpus validate <FILES>...
//! - aiscorpus normalize <INPUT> <OUTPUT>
//! - aiscorpus merge <REPORTS>...
//! - aiscorpus defaults <TYPE>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// aiscorpus - schema checks and corpus statistics for decoded AIS messages
#[derive(Parser, Debug)]
#[command(name = "aiscorpus")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to an optional JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides RUST_LOG
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print one report per file plus the merged report
    Info {
        /// JSON-lines shards
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print only the merged report
        #[arg(long)]
        merged_only: bool,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,

        /// Worker threads; overrides the config file
        #[arg(long)]
        threads: Option<usize>,
    },

    /// Print a diagnostic line for every rejected row
    Validate {
        /// JSON-lines shards
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Rewrite a shard in canonical form
    Normalize {
        /// Input JSON-lines file
        input: PathBuf,

        /// Output JSON-lines file
        output: PathBuf,

        /// Keep fields outside the message type's field set
        #[arg(long)]
        keep_extraneous: bool,
    },

    /// Merge persisted reports, in the order given
    Merge {
        /// Report files written by `info --merged-only`
        #[arg(required = true)]
        reports: Vec<PathBuf>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the default message of a message type
    Defaults {
        /// Message type id (1-27)
        #[arg(value_name = "TYPE")]
        type_id: i64,

        /// Include optional fields
        #[arg(long)]
        optional: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
