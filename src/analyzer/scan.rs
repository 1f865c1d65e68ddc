//! Shard scanning
//!
//! One shard is scanned by one thread; shards are spread over a fixed-size
//! pool of scoped threads and their summaries come back in input order, so
//! `reduce` over the result sees the shards in their natural order.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Mutex;
use std::thread;

use tracing::{error, info, warn};

use super::shard::ShardAnalyzer;
use super::summary::CorpusSummary;
use crate::io::{open_json_lines, MessageSource, SourceError, SourceResult};
use crate::observability::Event;
use crate::schema::SchemaEngine;

/// Options applied to every shard of a scan.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Cast every known field to its declared kind on import.
    pub force_cast: bool,
}

/// Imports and folds every row of `source`.
///
/// Undecodable records count as invalid rows. An I/O failure ends the
/// shard; rows read up to that point are kept.
pub fn scan_source<S: MessageSource>(
    engine: SchemaEngine<'_>,
    source: S,
    options: ScanOptions,
) -> CorpusSummary {
    let name = source.name().map(str::to_string);
    let label = name.as_deref().unwrap_or("<unnamed>");
    let mut analyzer = ShardAnalyzer::for_source(engine, name.as_deref());

    info!(
        event = Event::ShardScanStart.as_str(),
        shard = label,
        declared_mmsi = ?analyzer.declared(),
        "scanning shard"
    );

    for item in source {
        match item {
            Ok(raw) => match engine.import_values(raw, true, options.force_cast) {
                Ok(msg) => {
                    analyzer.fold(msg);
                }
                Err(e) => {
                    warn!(event = Event::RowInvalid.as_str(), shard = label, code = e.code(), error = %e, "import failed");
                    analyzer.fold_unreadable();
                }
            },
            Err(e) if e.is_record_level() => {
                warn!(event = Event::SourceReadFailed.as_str(), shard = label, code = e.code(), error = %e, "skipping record");
                analyzer.fold_unreadable();
            }
            Err(e) => {
                report(Event::SourceReadFailed, label, &e);
                break;
            }
        }
    }

    let summary = analyzer.finish();
    info!(
        event = Event::ShardScanComplete.as_str(),
        shard = label,
        rows = summary.num_rows,
        invalid = summary.num_invalid_rows,
        incomplete = summary.num_incomplete_rows,
        "shard scanned"
    );
    summary
}

/// Scans every source, using up to `threads` threads. Results are in input
/// order; a shard whose scan panicked is logged and reported empty.
pub fn scan_shards<S>(
    engine: SchemaEngine<'_>,
    sources: Vec<S>,
    threads: usize,
    options: ScanOptions,
) -> Vec<CorpusSummary>
where
    S: MessageSource + Send,
{
    map_ordered(sources, threads, |source| scan_source(engine, source, options))
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.unwrap_or_else(|| {
                let name = format!("shard #{}", index);
                report(Event::ShardPanicked, &name, &SourceError::Panicked { name: name.clone() });
                CorpusSummary::default()
            })
        })
        .collect()
}

/// Opens and scans JSON-lines files, using up to `threads` threads.
///
/// Each file is opened by the thread that scans it. A file that cannot be
/// opened, or whose scan panicked, yields its error in its slot.
pub fn scan_paths(
    engine: SchemaEngine<'_>,
    paths: Vec<PathBuf>,
    threads: usize,
    options: ScanOptions,
) -> Vec<SourceResult<CorpusSummary>> {
    let labels: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
    map_ordered(paths, threads, |path| {
        open_json_lines(&path)
            .map(|source| scan_source(engine, source, options))
            .map_err(|e| {
                report(Event::SourceOpenFailed, &path.display().to_string(), &e);
                e
            })
    })
    .into_iter()
    .zip(labels)
    .map(|(slot, label)| match slot {
        Some(result) => result,
        None => {
            report(Event::ShardPanicked, &label, &SourceError::Panicked { name: label.clone() });
            Err(SourceError::Panicked { name: label })
        }
    })
    .collect()
}

/// Logs a shard-level problem at `error` for failures, `warn` otherwise.
fn report(event: Event, shard: &str, e: &SourceError) {
    if event.is_failure() {
        error!(event = event.as_str(), shard, code = e.code(), error = %e, "shard failed");
    } else {
        warn!(event = event.as_str(), shard, code = e.code(), error = %e, "shard truncated");
    }
}

/// Applies `f` to every item on a pool of scoped threads.
///
/// Slot `i` of the result holds `f(items[i])`, or `None` if that call
/// panicked. A panic only loses its own item.
fn map_ordered<T, R, F>(items: Vec<T>, threads: usize, f: F) -> Vec<Option<R>>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync,
{
    let call = |item: T| panic::catch_unwind(AssertUnwindSafe(|| f(item))).ok();

    let len = items.len();
    let workers = threads.max(1).min(len);
    if workers <= 1 {
        return items.into_iter().map(call).collect();
    }

    let queue = Mutex::new(items.into_iter().enumerate());
    let mut slots: Vec<Option<R>> = (0..len).map(|_| None).collect();

    thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let queue = &queue;
                let call = &call;
                scope.spawn(move || {
                    let mut done = Vec::new();
                    loop {
                        let next = match queue.lock() {
                            Ok(mut q) => q.next(),
                            Err(poisoned) => poisoned.into_inner().next(),
                        };
                        let Some((index, item)) = next else {
                            break;
                        };
                        done.push((index, call(item)));
                    }
                    done
                })
            })
            .collect();

        for handle in handles {
            if let Ok(done) = handle.join() {
                for (index, result) in done {
                    slots[index] = result;
                }
            }
        }
    });

    slots
}
