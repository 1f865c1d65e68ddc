//! Streaming corpus analyzer
//!
//! Each shard (one file, one stream) is folded into a `CorpusSummary`
//! independently; summaries combine with an associative `merge` whose
//! identity is the empty summary. Reduction is a left fold over the shards
//! in their natural order, because file contiguity (`is_sorted_files`)
//! depends on that order.

mod scan;
mod shard;
mod summary;

pub use scan::{scan_paths, scan_shards, scan_source, ScanOptions};
pub use shard::{declared_mmsi, RowClass, ShardAnalyzer};
pub use summary::{reduce, CorpusSummary};
