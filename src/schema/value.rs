//! Value and message model
//!
//! A `Message` is a mapping from field name to `Value`, plus a quarantine
//! holding fields that failed coercion or validation. Messages travel through
//! the engine by value; the engine never keeps one past the call.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::{Map as JsonMap, Number, Value as JsonValue};

use super::coerce;

/// Reserved key that holds the quarantine in the JSON form of a message.
pub const QUARANTINE_KEY: &str = "__invalid__";

/// Reserved quarantine entry listing absent required fields.
pub const MISSING_FIELDS_KEY: &str = "missing-fields";

/// A decoded field value, or a raw wire value awaiting import.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Wide (unicode) string
    Text(String),
    /// Narrow string, as produced by container formats with raw strings
    Bytes(Vec<u8>),
    Timestamp(DateTime<Utc>),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

// -2^63 and 2^63 are exact as f64; the ceiling itself is out of range.
const I64_FLOOR: f64 = i64::MIN as f64;
const I64_CEIL: f64 = -(i64::MIN as f64);

impl Value {
    /// Wire type name used in rejection reasons.
    pub fn wire_type(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Timestamp(_) => "timestamp",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of ints and floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Integer view of ints and integral floats that fit in an `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 && (I64_FLOOR..I64_CEIL).contains(f) => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Equality that treats `Int(91)` and `Float(91.0)` as the same value.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => self == other,
        }
    }

    /// Converts a decoded JSON value.
    ///
    /// Numbers that fit `i64` become `Int`; every other number is a `Float`.
    pub fn from_json(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => Value::Text(s),
            JsonValue::Array(items) => Value::List(items.into_iter().map(Value::from_json).collect()),
            JsonValue::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Renders as JSON. Timestamps use the wire format, narrow strings are
    /// decoded lossily, non-finite floats become `null`.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Int(i) => JsonValue::Number((*i).into()),
            Value::Float(f) => Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
            Value::Text(s) => JsonValue::String(s.clone()),
            Value::Bytes(b) => JsonValue::String(String::from_utf8_lossy(b).into_owned()),
            Value::Timestamp(ts) => JsonValue::String(coerce::format_timestamp(ts)),
            Value::List(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(map) => JsonValue::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
            Value::Bytes(b) => write!(f, "{}", String::from_utf8_lossy(b)),
            Value::Timestamp(ts) => write!(f, "{}", coerce::format_timestamp(ts)),
            Value::List(_) | Value::Map(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

/// Why a field was moved into the quarantine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// Null where the field is not nullable
    Null,
    /// Wrong wire type; carries the accepted type names
    Type { expected: String },
    /// Domain test failed
    Domain,
    /// Import coercion failed
    CoercionFailed { cause: String },
    /// Export coercion failed
    ExportFailed { cause: String },
}

impl Reason {
    /// Short tag used in diagnostics and in the JSON quarantine.
    pub fn tag(&self) -> &str {
        match self {
            Reason::Null => "null",
            Reason::Type { expected } => expected,
            Reason::Domain => "domain",
            Reason::CoercionFailed { .. } => "coercion-failed",
            Reason::ExportFailed { .. } => "export-failed",
        }
    }

    fn cause(&self) -> Option<&str> {
        match self {
            Reason::CoercionFailed { cause } | Reason::ExportFailed { cause } => Some(cause),
            _ => None,
        }
    }

    fn from_tag(tag: &str, cause: Option<String>) -> Self {
        let cause = cause.unwrap_or_default();
        match tag {
            "null" => Reason::Null,
            "domain" => Reason::Domain,
            "coercion-failed" => Reason::CoercionFailed { cause },
            "export-failed" => Reason::ExportFailed { cause },
            other => Reason::Type {
                expected: other.to_string(),
            },
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cause() {
            Some(cause) => write!(f, "{} ({})", self.tag(), cause),
            None => write!(f, "{}", self.tag()),
        }
    }
}

/// A field that failed, with the offending raw value.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub reason: Reason,
    pub raw: Value,
}

impl Rejection {
    pub fn new(reason: Reason, raw: Value) -> Self {
        Self { reason, raw }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.reason, self.raw)
    }
}

/// Fields removed from a message, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Quarantine {
    rejected: BTreeMap<String, Rejection>,
    missing: Vec<String>,
}

impl Quarantine {
    pub fn is_empty(&self) -> bool {
        self.rejected.is_empty() && self.missing.is_empty()
    }

    /// Records a rejection, replacing an earlier one for the same field.
    pub fn reject(&mut self, field: impl Into<String>, rejection: Rejection) {
        self.rejected.insert(field.into(), rejection);
    }

    pub fn get(&self, field: &str) -> Option<&Rejection> {
        self.rejected.get(field)
    }

    pub fn rejected(&self) -> impl Iterator<Item = (&str, &Rejection)> {
        self.rejected.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }

    /// Required fields found absent by the last completeness check.
    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    pub fn set_missing(&mut self, mut names: Vec<String>) {
        names.sort();
        names.dedup();
        self.missing = names;
    }

    fn to_json(&self) -> JsonValue {
        let mut out = JsonMap::new();
        for (field, rejection) in &self.rejected {
            let mut entry = JsonMap::new();
            entry.insert("reason".into(), JsonValue::String(rejection.reason.tag().to_string()));
            entry.insert("value".into(), rejection.raw.to_json());
            if let Some(cause) = rejection.reason.cause() {
                entry.insert("cause".into(), JsonValue::String(cause.to_string()));
            }
            out.insert(field.clone(), JsonValue::Object(entry));
        }
        if !self.missing.is_empty() {
            out.insert(
                MISSING_FIELDS_KEY.into(),
                JsonValue::Array(self.missing.iter().cloned().map(JsonValue::String).collect()),
            );
        }
        JsonValue::Object(out)
    }

    fn from_json(json: JsonValue) -> Self {
        let mut quarantine = Quarantine::default();
        let JsonValue::Object(map) = json else {
            return quarantine;
        };
        for (key, entry) in map {
            if key == MISSING_FIELDS_KEY {
                let names = match entry {
                    JsonValue::Array(items) => items
                        .into_iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect(),
                    _ => Vec::new(),
                };
                quarantine.set_missing(names);
                continue;
            }
            let JsonValue::Object(mut fields) = entry else {
                continue;
            };
            let tag = fields
                .get("reason")
                .and_then(JsonValue::as_str)
                .unwrap_or("domain")
                .to_string();
            let cause = fields
                .get("cause")
                .and_then(JsonValue::as_str)
                .map(str::to_string);
            let raw = fields.remove("value").map_or(Value::Null, Value::from_json);
            quarantine.reject(key, Rejection::new(Reason::from_tag(&tag, cause), raw));
        }
        quarantine
    }
}

/// One decoded AIS/GPS record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    fields: BTreeMap<String, Value>,
    quarantine: Quarantine,
}

impl Message {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The raw `type` discriminator, if present.
    pub fn message_type(&self) -> Option<&Value> {
        self.fields.get("type")
    }

    pub fn quarantine(&self) -> &Quarantine {
        &self.quarantine
    }

    pub fn quarantine_mut(&mut self) -> &mut Quarantine {
        &mut self.quarantine
    }

    /// Moves a field into the quarantine.
    pub fn quarantine_field(&mut self, field: &str, reason: Reason) {
        if let Some(raw) = self.fields.remove(field) {
            self.quarantine.reject(field, Rejection::new(reason, raw));
        }
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut BTreeMap<String, Value>, &mut Quarantine) {
        (&mut self.fields, &mut self.quarantine)
    }

    pub(crate) fn into_parts(self) -> (BTreeMap<String, Value>, Quarantine) {
        (self.fields, self.quarantine)
    }

    pub(crate) fn from_parts(fields: BTreeMap<String, Value>, quarantine: Quarantine) -> Self {
        Self { fields, quarantine }
    }

    /// Builds a message from a decoded JSON object.
    ///
    /// Returns `None` when `json` is not an object. A `__invalid__` key is
    /// read back into the quarantine.
    pub fn from_json(json: JsonValue) -> Option<Self> {
        let JsonValue::Object(map) = json else {
            return None;
        };
        let mut message = Message::new();
        for (key, value) in map {
            if key == QUARANTINE_KEY {
                message.quarantine = Quarantine::from_json(value);
            } else {
                message.fields.insert(key, Value::from_json(value));
            }
        }
        Some(message)
    }

    /// Renders as a JSON object, with the quarantine under `__invalid__`
    /// when it is not empty.
    pub fn to_json(&self) -> JsonValue {
        let mut out: JsonMap<String, JsonValue> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        if !self.quarantine.is_empty() {
            out.insert(QUARANTINE_KEY.into(), self.quarantine.to_json());
        }
        JsonValue::Object(out)
    }
}

impl FromIterator<(String, Value)> for Message {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
            quarantine: Quarantine::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_number_kinds() {
        assert_eq!(Value::from_json(json!(5)), Value::Int(5));
        assert_eq!(Value::from_json(json!(5.5)), Value::Float(5.5));
        assert_eq!(Value::from_json(json!(u64::MAX)), Value::Float(u64::MAX as f64));
    }

    #[test]
    fn test_loose_eq_crosses_int_and_float() {
        assert!(Value::Int(91).loose_eq(&Value::Float(91.0)));
        assert!(!Value::Int(91).loose_eq(&Value::Float(91.5)));
        assert!(!Value::Text("91".into()).loose_eq(&Value::Int(91)));
    }

    #[test]
    fn test_as_i64_integral_floats_only() {
        assert_eq!(Value::Float(42.0).as_i64(), Some(42));
        assert_eq!(Value::Float(42.5).as_i64(), None);
        assert_eq!(Value::Text("42".into()).as_i64(), None);
    }

    #[test]
    fn test_as_i64_refuses_out_of_range_floats() {
        assert_eq!(Value::Float(1e20).as_i64(), None);
        assert_eq!(Value::Float(-1e20).as_i64(), None);
        assert_eq!(Value::Float(9_223_372_036_854_775_808.0).as_i64(), None);
        assert_eq!(Value::Float(-9_223_372_036_854_775_808.0).as_i64(), Some(i64::MIN));
        assert_eq!(Value::Float(f64::INFINITY).as_i64(), None);
        assert_eq!(Value::Float(f64::NAN).as_i64(), None);
    }

    #[test]
    fn test_message_json_carries_quarantine() {
        let mut msg = Message::from_json(json!({"type": 1, "lat": -100.0})).unwrap();
        msg.quarantine_field("lat", Reason::Domain);
        msg.quarantine_mut().set_missing(vec!["status".into(), "repeat".into()]);

        let rendered = msg.to_json();
        assert_eq!(rendered["__invalid__"]["lat"]["reason"], "domain");
        assert_eq!(rendered["__invalid__"]["lat"]["value"], -100.0);
        assert_eq!(rendered["__invalid__"]["missing-fields"], json!(["repeat", "status"]));

        let restored = Message::from_json(rendered).unwrap();
        assert_eq!(restored, msg);
    }

    #[test]
    fn test_message_json_rejects_non_object() {
        assert!(Message::from_json(json!([1, 2, 3])).is_none());
    }

    #[test]
    fn test_reason_display_includes_cause() {
        let reason = Reason::CoercionFailed {
            cause: "bad digits".into(),
        };
        assert_eq!(reason.to_string(), "coercion-failed (bad digits)");
        assert_eq!(Reason::Domain.to_string(), "domain");
    }
}
