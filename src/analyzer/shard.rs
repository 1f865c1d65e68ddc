//! Per-shard fold

use std::sync::OnceLock;

use regex::Regex;
use tracing::trace;

use super::summary::CorpusSummary;
use crate::observability::Event;
use crate::schema::{Message, SchemaEngine};

const LON_UNAVAILABLE: f64 = 181.0;
const LAT_UNAVAILABLE: f64 = 91.0;

static DECLARATION: OnceLock<Option<Regex>> = OnceLock::new();

/// The MMSI a shard name declares, e.g. `vessel_mmsi=367000001.json`.
///
/// When several declarations appear the last one wins.
pub fn declared_mmsi(name: &str) -> Option<i64> {
    let re = DECLARATION
        .get_or_init(|| Regex::new(r"mmsi=(\d+)").ok())
        .as_ref()?;
    re.captures_iter(name)
        .last()
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// How a folded row was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowClass {
    Valid,
    /// Every present field is valid but a required one is absent.
    Incomplete,
    /// At least one field was quarantined, or the row was unreadable.
    Invalid,
}

/// Folds the rows of a single shard into a `CorpusSummary`.
///
/// Folding never fails: rows that cannot be classified count as invalid.
#[derive(Debug)]
pub struct ShardAnalyzer<'r> {
    engine: SchemaEngine<'r>,
    declared_mmsi: Option<i64>,
    summary: CorpusSummary,
}

impl<'r> ShardAnalyzer<'r> {
    pub fn new(engine: SchemaEngine<'r>) -> Self {
        Self {
            engine,
            declared_mmsi: None,
            summary: CorpusSummary::new(),
        }
    }

    /// Analyzer for a named shard; the name may declare an MMSI.
    pub fn for_source(engine: SchemaEngine<'r>, name: Option<&str>) -> Self {
        match name.and_then(declared_mmsi) {
            Some(mmsi) => Self::with_declared_mmsi(engine, mmsi),
            None => Self::new(engine),
        }
    }

    pub fn with_declared_mmsi(engine: SchemaEngine<'r>, mmsi: i64) -> Self {
        let mut summary = CorpusSummary::new();
        summary.mmsi_declaration = Some(true);
        Self {
            engine,
            declared_mmsi: Some(mmsi),
            summary,
        }
    }

    pub fn declared(&self) -> Option<i64> {
        self.declared_mmsi
    }

    /// Folds one imported row.
    pub fn fold(&mut self, mut msg: Message) -> RowClass {
        self.fold_in_place(&mut msg)
    }

    /// Folds one imported row, leaving it validated with its failures in
    /// the quarantine.
    pub fn fold_in_place(&mut self, msg: &mut Message) -> RowClass {
        self.summary.num_rows += 1;

        // histograms see the raw values, before validation removes anything
        if let Some(t) = msg.message_type() {
            self.summary.count_type(t.to_string());
        }
        if let Some(mmsi) = msg.get("mmsi") {
            self.summary.count_mmsi(mmsi.to_string());
            if let Some(declared) = self.declared_mmsi {
                if mmsi.as_i64() != Some(declared) {
                    self.summary.mmsi_declaration = Some(false);
                }
            }
        }

        let class = self.classify(msg);
        match class {
            RowClass::Valid => {}
            RowClass::Incomplete => self.summary.num_incomplete_rows += 1,
            RowClass::Invalid => {
                self.summary.num_invalid_rows += 1;
                trace!(
                    event = Event::RowInvalid.as_str(),
                    row = self.summary.num_rows,
                    rejected = msg.quarantine().rejected_count(),
                    "invalid row"
                );
            }
        }

        let lon = msg
            .get("lon")
            .and_then(|v| v.as_f64())
            .filter(|v| *v != LON_UNAVAILABLE);
        let lat = msg
            .get("lat")
            .and_then(|v| v.as_f64())
            .filter(|v| *v != LAT_UNAVAILABLE);
        self.summary.observe_position(lon, lat);

        if let Some(ts) = msg.get("timestamp").and_then(|v| v.as_timestamp()) {
            self.summary.observe_timestamp(ts);
        }
        class
    }

    /// Counts a row the source could not decode.
    pub fn fold_unreadable(&mut self) {
        self.summary.num_rows += 1;
        self.summary.num_invalid_rows += 1;
    }

    pub fn summary(&self) -> &CorpusSummary {
        &self.summary
    }

    pub fn finish(self) -> CorpusSummary {
        self.summary
    }

    fn classify(&self, msg: &mut Message) -> RowClass {
        let already_rejected = msg.quarantine().rejected_count() > 0;
        match self.engine.validate(msg, true, true) {
            Ok(true) if !already_rejected => {}
            _ => return RowClass::Invalid,
        }
        match self.engine.validate(msg, false, true) {
            Ok(true) => RowClass::Valid,
            Ok(false) => RowClass::Incomplete,
            Err(_) => RowClass::Invalid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(json: serde_json::Value) -> Message {
        Message::from_json(json).unwrap()
    }

    fn analyzer() -> ShardAnalyzer<'static> {
        ShardAnalyzer::new(SchemaEngine::current())
    }

    #[test]
    fn test_declared_mmsi_from_name() {
        assert_eq!(declared_mmsi("data/mmsi=367000001.json"), Some(367000001));
        assert_eq!(declared_mmsi("mmsi=1/mmsi=2.json"), Some(2));
        assert_eq!(declared_mmsi("plain.json"), None);
    }

    #[test]
    fn test_fold_classifies_rows() {
        let mut a = analyzer();
        let engine = SchemaEngine::current();
        let full = engine.default_message(1, false).unwrap();
        assert_eq!(a.fold(full), RowClass::Valid);
        assert_eq!(a.fold(row(json!({"type": 1}))), RowClass::Incomplete);
        assert_eq!(a.fold(row(json!({"type": 1, "lat": 200.0}))), RowClass::Invalid);
        assert_eq!(a.fold(row(json!({"lat": 1.0}))), RowClass::Incomplete);

        let s = a.finish();
        assert_eq!(s.num_rows, 4);
        assert_eq!(s.num_incomplete_rows, 2);
        assert_eq!(s.num_invalid_rows, 1);
        assert_eq!(s.msg_type_hist.get("1"), Some(&3));
    }

    #[test]
    fn test_unknown_type_counts_invalid() {
        let mut a = analyzer();
        assert_eq!(a.fold(row(json!({"type": 99}))), RowClass::Invalid);
        assert_eq!(a.summary().msg_type_hist.get("99"), Some(&1));
    }

    #[test]
    fn test_position_bounds_skip_unavailable() {
        let mut a = analyzer();
        a.fold(row(json!({"type": 1, "lon": 181.0, "lat": 91.0})));
        a.fold(row(json!({"type": 1, "lon": -20.5, "lat": 45.0})));
        a.fold(row(json!({"type": 1, "lon": 10.0, "lat": 500.0})));
        let s = a.finish();
        assert_eq!(s.lon_min, Some(-20.5));
        assert_eq!(s.lon_max, Some(10.0));
        assert_eq!(s.lat_min, Some(45.0));
        assert_eq!(s.lat_max, Some(45.0));
    }

    #[test]
    fn test_declaration_mismatch() {
        let engine = SchemaEngine::current();
        let mut a = ShardAnalyzer::for_source(engine, Some("mmsi=99.json"));
        assert_eq!(a.summary().mmsi_declaration, Some(true));
        a.fold(row(json!({"type": 1, "mmsi": 99})));
        assert_eq!(a.summary().mmsi_declaration, Some(true));
        a.fold(row(json!({"type": 1, "mmsi": 42})));
        let s = a.finish();
        assert_eq!(s.mmsi_declaration, Some(false));
        assert_eq!(s.mmsi_hist.get("42"), Some(&1));
    }

    #[test]
    fn test_undeclared_shard_has_no_declaration() {
        let mut a = analyzer();
        a.fold(row(json!({"type": 1, "mmsi": 42})));
        assert_eq!(a.finish().mmsi_declaration, None);
    }

    #[test]
    fn test_fold_in_place_keeps_quarantine() {
        let mut a = analyzer();
        let mut m = row(json!({"type": 1, "lat": 200.0}));
        assert_eq!(a.fold_in_place(&mut m), RowClass::Invalid);
        assert_eq!(m.quarantine().get("lat").unwrap().reason.tag(), "domain");
    }

    fn timed(secs: Option<i64>) -> Message {
        let mut m = row(json!({"type": 1}));
        if let Some(secs) = secs {
            let ts = chrono::DateTime::from_timestamp(1_420_070_400 + secs, 0).unwrap();
            m.insert("timestamp", ts);
        }
        m
    }

    #[test]
    fn test_untimed_row_keeps_previous_timestamp() {
        let mut a = analyzer();
        a.fold(timed(Some(2)));
        a.fold(timed(None));
        a.fold(timed(Some(1)));
        assert!(!a.summary().is_sorted);
        assert!(!a.summary().is_sorted_files);

        let mut a = analyzer();
        a.fold(timed(Some(1)));
        a.fold(timed(None));
        a.fold(timed(Some(2)));
        assert!(a.summary().is_sorted);
        assert_eq!(a.summary().num_rows, 3);
    }

    #[test]
    fn test_quarantined_timestamp_is_skipped_for_order() {
        let engine = SchemaEngine::current();
        let garbled = engine
            .import_values(row(json!({"type": 1, "timestamp": "noon"})), true, false)
            .unwrap();

        let mut a = analyzer();
        a.fold(timed(Some(1)));
        assert_eq!(a.fold(garbled.clone()), RowClass::Invalid);
        a.fold(timed(Some(2)));
        assert!(a.summary().is_sorted);
        assert_eq!(a.summary().min_timestamp, timed(Some(1)).get("timestamp").and_then(|v| v.as_timestamp()));

        let mut a = analyzer();
        a.fold(timed(Some(2)));
        a.fold(garbled);
        a.fold(timed(Some(1)));
        assert!(!a.summary().is_sorted);
    }

    #[test]
    fn test_unreadable_rows_count_invalid() {
        let mut a = analyzer();
        a.fold_unreadable();
        let s = a.finish();
        assert_eq!((s.num_rows, s.num_invalid_rows), (1, 1));
    }
}
