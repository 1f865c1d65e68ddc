//! Observable events
//!
//! Every log line emitted by the crate carries an `event` field naming one
//! of these. Events are explicit and typed.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration file loaded
    ConfigLoaded,

    // Shard scanning
    /// A shard scan started
    ShardScanStart,
    /// A shard scan finished and produced a summary
    ShardScanComplete,
    /// The source could not decode a record
    SourceReadFailed,
    /// The source could not be opened at all
    SourceOpenFailed,
    /// Scanning a shard panicked; its summary is lost
    ShardPanicked,

    // Per-row diagnostics
    /// A field was quarantined during coercion
    RowRejected,
    /// A row failed validation
    RowInvalid,

    // Reduction
    /// Shard summaries were merged
    ReportsMerged,

    // Re-emission
    /// A normalization pass finished
    NormalizeComplete,
}

impl Event {
    /// Returns the event name
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ShardScanStart => "SHARD_SCAN_START",
            Event::ShardScanComplete => "SHARD_SCAN_COMPLETE",
            Event::SourceReadFailed => "SOURCE_READ_FAILED",
            Event::SourceOpenFailed => "SOURCE_OPEN_FAILED",
            Event::ShardPanicked => "SHARD_PANICKED",
            Event::RowRejected => "ROW_REJECTED",
            Event::RowInvalid => "ROW_INVALID",
            Event::ReportsMerged => "REPORTS_MERGED",
            Event::NormalizeComplete => "NORMALIZE_COMPLETE",
        }
    }

    /// Events that indicate a whole shard could not be processed
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::SourceOpenFailed | Event::ShardPanicked)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
