//! Command-line interface
//!
//! - info: per-file and merged corpus reports
//! - validate: per-row diagnostics
//! - normalize: canonical re-emission of a shard
//! - merge: combine persisted reports
//! - defaults: default message of a type

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{defaults_cmd, info_cmd, merge_cmd, normalize_cmd, run, run_command, validate_cmd};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_report, write_json};
