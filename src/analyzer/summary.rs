//! Mergeable corpus summary
//!
//! Merge rules:
//! - counts and histograms add
//! - bounds take min/max
//! - `is_sorted` is the AND of both sides
//! - `is_sorted_files` additionally requires the left side's max timestamp
//!   to be <= the right side's min timestamp, so it depends on merge order
//! - `mmsi_declaration` ignores undeclared sides and ANDs the rest
//!
//! `CorpusSummary::default()` is the identity element.
//!
//! While a shard is sorted its min/max timestamps are also its first/last
//! timestamps, which is all the contiguity check needs.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Statistics over one shard, or over several merged shards.
///
/// Serializes to the persisted report shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusSummary {
    pub num_rows: u64,
    pub num_incomplete_rows: u64,
    pub num_invalid_rows: u64,
    pub lon_min: Option<f64>,
    pub lon_max: Option<f64>,
    pub lat_min: Option<f64>,
    pub lat_max: Option<f64>,
    #[serde(with = "report_timestamp")]
    pub min_timestamp: Option<DateTime<Utc>>,
    #[serde(with = "report_timestamp")]
    pub max_timestamp: Option<DateTime<Utc>>,
    pub is_sorted: bool,
    pub is_sorted_files: bool,
    pub mmsi_declaration: Option<bool>,
    pub mmsi_hist: BTreeMap<String, u64>,
    pub msg_type_hist: BTreeMap<String, u64>,
}

impl Default for CorpusSummary {
    fn default() -> Self {
        Self {
            num_rows: 0,
            num_incomplete_rows: 0,
            num_invalid_rows: 0,
            lon_min: None,
            lon_max: None,
            lat_min: None,
            lat_max: None,
            min_timestamp: None,
            max_timestamp: None,
            is_sorted: true,
            is_sorted_files: true,
            mmsi_declaration: None,
            mmsi_hist: BTreeMap::new(),
            msg_type_hist: BTreeMap::new(),
        }
    }
}

impl CorpusSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Combines two summaries; `self` is the earlier shard.
    pub fn merge(&self, later: &CorpusSummary) -> CorpusSummary {
        let contiguous = match (self.max_timestamp, later.min_timestamp) {
            (Some(left), Some(right)) => left <= right,
            _ => true,
        };
        CorpusSummary {
            num_rows: self.num_rows + later.num_rows,
            num_incomplete_rows: self.num_incomplete_rows + later.num_incomplete_rows,
            num_invalid_rows: self.num_invalid_rows + later.num_invalid_rows,
            lon_min: pick(self.lon_min, later.lon_min, f64::min),
            lon_max: pick(self.lon_max, later.lon_max, f64::max),
            lat_min: pick(self.lat_min, later.lat_min, f64::min),
            lat_max: pick(self.lat_max, later.lat_max, f64::max),
            min_timestamp: pick(self.min_timestamp, later.min_timestamp, std::cmp::min),
            max_timestamp: pick(self.max_timestamp, later.max_timestamp, std::cmp::max),
            is_sorted: self.is_sorted && later.is_sorted,
            is_sorted_files: self.is_sorted_files && later.is_sorted_files && contiguous,
            mmsi_declaration: match (self.mmsi_declaration, later.mmsi_declaration) {
                (Some(a), Some(b)) => Some(a && b),
                (a, b) => a.or(b),
            },
            mmsi_hist: add_hist(&self.mmsi_hist, &later.mmsi_hist),
            msg_type_hist: add_hist(&self.msg_type_hist, &later.msg_type_hist),
        }
    }

    pub(crate) fn observe_position(&mut self, lon: Option<f64>, lat: Option<f64>) {
        if let Some(lon) = lon {
            self.lon_min = pick(self.lon_min, Some(lon), f64::min);
            self.lon_max = pick(self.lon_max, Some(lon), f64::max);
        }
        if let Some(lat) = lat {
            self.lat_min = pick(self.lat_min, Some(lat), f64::min);
            self.lat_max = pick(self.lat_max, Some(lat), f64::max);
        }
    }

    /// Folds one timestamp in arrival order.
    pub(crate) fn observe_timestamp(&mut self, ts: DateTime<Utc>) {
        if self.is_sorted && self.max_timestamp.map_or(false, |prev| ts < prev) {
            self.is_sorted = false;
            self.is_sorted_files = false;
        }
        self.min_timestamp = pick(self.min_timestamp, Some(ts), std::cmp::min);
        self.max_timestamp = pick(self.max_timestamp, Some(ts), std::cmp::max);
    }

    pub(crate) fn count_mmsi(&mut self, key: String) {
        *self.mmsi_hist.entry(key).or_insert(0) += 1;
    }

    pub(crate) fn count_type(&mut self, key: String) {
        *self.msg_type_hist.entry(key).or_insert(0) += 1;
    }

    /// Number of rows that were neither invalid nor incomplete.
    pub fn num_valid_rows(&self) -> u64 {
        self.num_rows
            .saturating_sub(self.num_invalid_rows)
            .saturating_sub(self.num_incomplete_rows)
    }

    pub fn to_json(&self) -> serde_json::Value {
        // Every field is a plain map/number/string; serialization cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Merges summaries left to right, in the order given.
///
/// The result does not depend on how the sequence is grouped, but
/// `is_sorted_files` does depend on the order of the sequence itself:
/// pass shards in their natural order (e.g. sorted by file name).
pub fn reduce<I>(summaries: I) -> CorpusSummary
where
    I: IntoIterator<Item = CorpusSummary>,
{
    summaries
        .into_iter()
        .fold(CorpusSummary::default(), |acc, s| acc.merge(&s))
}

fn pick<T: Copy>(a: Option<T>, b: Option<T>, f: fn(T, T) -> T) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(f(a, b)),
        (a, b) => a.or(b),
    }
}

fn add_hist(a: &BTreeMap<String, u64>, b: &BTreeMap<String, u64>) -> BTreeMap<String, u64> {
    let mut out = a.clone();
    for (key, count) in b {
        *out.entry(key.clone()).or_insert(0) += count;
    }
    out
}

mod report_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    use crate::schema::coerce;

    pub fn serialize<S: Serializer>(ts: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => s.serialize_str(&coerce::format_timestamp(ts)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(wire) => coerce::parse_timestamp(&wire).map(Some).map_err(de::Error::custom),
            None => Ok(None),
        }
    }
}
