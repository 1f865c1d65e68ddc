//! Corpus summary laws
//!
//! - the empty summary is the merge identity
//! - merge is associative
//! - merge is commutative except for `is_sorted_files`
//! - folding N rows counts N rows, whatever their contents

use aiscorpus::analyzer::{reduce, scan_source, CorpusSummary, ScanOptions, ShardAnalyzer};
use aiscorpus::io::VecSource;
use aiscorpus::schema::{Message, SchemaEngine, Value};
use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use serde_json::json;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap()
}

fn at(secs: i64) -> DateTime<Utc> {
    base_time() + chrono::Duration::seconds(secs)
}

fn row_strategy() -> impl Strategy<Value = Message> {
    (
        0i64..30,
        prop::option::of(0i64..4),
        prop::option::of(prop_oneof![Just(91.0f64), -100.0f64..100.0]),
        prop::option::of(prop_oneof![Just(181.0f64), -200.0f64..200.0]),
        prop::option::of(0i64..10_000),
    )
        .prop_map(|(type_id, mmsi, lat, lon, ts)| {
            let mut m = Message::new();
            m.insert("type", Value::Int(type_id));
            if let Some(mmsi) = mmsi {
                m.insert("mmsi", Value::Int(mmsi));
            }
            if let Some(lat) = lat {
                m.insert("lat", Value::Float(lat));
            }
            if let Some(lon) = lon {
                m.insert("lon", Value::Float(lon));
            }
            if let Some(ts) = ts {
                m.insert("timestamp", Value::Timestamp(at(ts)));
            }
            m
        })
}

fn summary_strategy() -> impl Strategy<Value = CorpusSummary> {
    (
        prop::collection::vec(row_strategy(), 0..20),
        prop::option::of(0i64..4),
    )
        .prop_map(|(rows, declared)| {
            let engine = SchemaEngine::current();
            let mut analyzer = match declared {
                Some(mmsi) => ShardAnalyzer::with_declared_mmsi(engine, mmsi),
                None => ShardAnalyzer::new(engine),
            };
            for row in rows {
                analyzer.fold(row);
            }
            analyzer.finish()
        })
}

fn without_file_order(mut s: CorpusSummary) -> CorpusSummary {
    s.is_sorted_files = false;
    s
}

proptest! {
    #[test]
    fn empty_is_identity(a in summary_strategy()) {
        let empty = CorpusSummary::default();
        prop_assert_eq!(empty.merge(&a), a.clone());
        prop_assert_eq!(a.merge(&empty), a);
    }

    #[test]
    fn merge_is_associative(
        a in summary_strategy(),
        b in summary_strategy(),
        c in summary_strategy(),
    ) {
        prop_assert_eq!(a.merge(&b).merge(&c), a.merge(&b.merge(&c)));
    }

    #[test]
    fn merge_commutes_except_file_order(a in summary_strategy(), b in summary_strategy()) {
        prop_assert_eq!(
            without_file_order(a.merge(&b)),
            without_file_order(b.merge(&a))
        );
    }

    #[test]
    fn fold_counts_every_row(rows in prop::collection::vec(row_strategy(), 0..50)) {
        let n = rows.len() as u64;
        let s = scan_source(SchemaEngine::current(), VecSource::new(rows), ScanOptions::default());
        prop_assert_eq!(s.num_rows, n);
        prop_assert!(s.num_invalid_rows + s.num_incomplete_rows <= n);
        let type_total: u64 = s.msg_type_hist.values().sum();
        prop_assert_eq!(type_total, n);
    }

    #[test]
    fn splitting_a_shard_keeps_counts(
        rows in prop::collection::vec(row_strategy(), 0..40),
        cut in 0usize..40,
    ) {
        let engine = SchemaEngine::current();
        let cut = cut.min(rows.len());
        let whole = scan_source(engine, VecSource::new(rows.clone()), ScanOptions::default());
        let parts = reduce(vec![
            scan_source(engine, VecSource::new(rows[..cut].to_vec()), ScanOptions::default()),
            scan_source(engine, VecSource::new(rows[cut..].to_vec()), ScanOptions::default()),
        ]);
        prop_assert_eq!(parts.num_rows, whole.num_rows);
        prop_assert_eq!(parts.num_invalid_rows, whole.num_invalid_rows);
        prop_assert_eq!(parts.mmsi_hist, whole.mmsi_hist);
        prop_assert_eq!(parts.lat_min, whole.lat_min);
        prop_assert_eq!(parts.max_timestamp, whole.max_timestamp);
        prop_assert!(!whole.is_sorted || parts.is_sorted);
        prop_assert_eq!(parts.is_sorted_files, whole.is_sorted);
    }
}

// =============================================================================
// Scenarios
// =============================================================================

fn timed_shard(secs: &[i64]) -> CorpusSummary {
    let rows = secs
        .iter()
        .map(|s| {
            let mut m = Message::new();
            m.insert("type", Value::Int(1));
            m.insert("timestamp", Value::Timestamp(at(*s)));
            m
        })
        .collect();
    scan_source(SchemaEngine::current(), VecSource::new(rows), ScanOptions::default())
}

/// Contiguous shards stay file-sorted; overlapping ones do not.
#[test]
fn test_file_contiguity() {
    let shard1 = timed_shard(&[0, 10]);
    let shard2 = timed_shard(&[10, 20]);
    assert!(shard1.is_sorted_files && shard2.is_sorted_files);
    assert!(shard1.merge(&shard2).is_sorted_files);

    let overlapping = timed_shard(&[5, 30]);
    assert!(overlapping.is_sorted_files);
    let merged = shard1.merge(&overlapping);
    assert!(merged.is_sorted);
    assert!(!merged.is_sorted_files);
}

/// A row contradicting the shard's declared MMSI clears the declaration for
/// good.
#[test]
fn test_declared_mmsi_mismatch_is_sticky() {
    let row = Message::from_json(json!({"type": 1, "mmsi": 42})).unwrap();
    let shard = scan_source(
        SchemaEngine::current(),
        VecSource::new(vec![row]).with_name("tracks/mmsi=99.json"),
        ScanOptions::default(),
    );
    assert_eq!(shard.num_rows, 1);
    assert_eq!(shard.mmsi_declaration, Some(false));

    let mut honest = CorpusSummary::default();
    honest.mmsi_declaration = Some(true);
    assert_eq!(shard.merge(&honest).mmsi_declaration, Some(false));
    assert_eq!(honest.merge(&shard).mmsi_declaration, Some(false));
    assert_eq!(
        shard.merge(&CorpusSummary::default()).mmsi_declaration,
        Some(false)
    );
}

#[test]
fn test_empty_corpus_report() {
    let report = reduce(Vec::new()).to_json();
    assert_eq!(report["num_rows"], 0);
    assert_eq!(report["lat_min"], serde_json::Value::Null);
    assert_eq!(report["is_sorted"], true);
}
