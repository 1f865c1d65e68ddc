//! Value coercion
//!
//! Timestamp import/export (the only fields whose wire form differs from
//! the typed form) and the per-kind casts applied by a forced import.

use chrono::{DateTime, NaiveDateTime, Utc};

use super::types::{Coercion, ValueKind};
use super::value::Value;

/// Wire format of timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Parse format; accepts any number of fractional digits.
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Wire string standing in for "no value" in formats without a native null.
pub const NULL_SENTINEL: &str = "__NULL__";

pub const TIMESTAMP: Coercion = Coercion {
    name: "timestamp",
    import: import_timestamp,
    export: export_timestamp,
};

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(wire: &str) -> Result<DateTime<Utc>, String> {
    NaiveDateTime::parse_from_str(wire, TIMESTAMP_PARSE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("invalid timestamp '{}': {}", wire, e))
}

fn import_timestamp(value: &Value) -> Result<Value, String> {
    match value {
        Value::Timestamp(_) | Value::Null => Ok(value.clone()),
        Value::Text(s) if s == NULL_SENTINEL => Ok(Value::Null),
        Value::Text(s) => parse_timestamp(s).map(Value::Timestamp),
        Value::Bytes(b) => {
            let s = std::str::from_utf8(b).map_err(|e| format!("narrow string is not UTF-8: {}", e))?;
            import_timestamp(&Value::Text(s.to_string()))
        }
        other => Err(format!("cannot import {} as timestamp", other.wire_type())),
    }
}

fn export_timestamp(value: &Value) -> Result<Value, String> {
    match value {
        Value::Timestamp(ts) => Ok(Value::Text(format_timestamp(ts))),
        Value::Null => Ok(Value::Text(NULL_SENTINEL.to_string())),
        Value::Text(_) => Ok(value.clone()),
        other => Err(format!("cannot export {} as timestamp", other.wire_type())),
    }
}

/// Casts a value to `kind` for forced imports. `Null` is never touched.
pub fn cast(kind: ValueKind, value: &Value) -> Result<Value, String> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    let fail = || format!("cannot cast {} '{}' to {}", value.wire_type(), value, kind);
    match kind {
        ValueKind::Any => Ok(value.clone()),
        ValueKind::Int => match value {
            Value::Int(_) => Ok(value.clone()),
            Value::Float(_) => value.as_i64().map(Value::Int).ok_or_else(fail),
            Value::Text(s) => s.trim().parse::<i64>().map(Value::Int).map_err(|_| fail()),
            _ => Err(fail()),
        },
        ValueKind::Float => match value {
            Value::Int(i) => Ok(Value::Float(*i as f64)),
            Value::Float(_) => Ok(value.clone()),
            Value::Text(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| fail()),
            _ => Err(fail()),
        },
        ValueKind::Bool => match value {
            Value::Bool(_) => Ok(value.clone()),
            Value::Int(0) => Ok(Value::Bool(false)),
            Value::Int(1) => Ok(Value::Bool(true)),
            Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(Value::Bool(true)),
                "false" | "0" => Ok(Value::Bool(false)),
                _ => Err(fail()),
            },
            _ => Err(fail()),
        },
        ValueKind::Text => match value {
            Value::Text(_) => Ok(value.clone()),
            Value::Bytes(b) => String::from_utf8(b.clone()).map(Value::Text).map_err(|_| fail()),
            Value::Int(_) | Value::Float(_) => Ok(Value::Text(value.to_string())),
            _ => Err(fail()),
        },
        ValueKind::Timestamp => import_timestamp(value),
        ValueKind::List => match value {
            Value::List(_) => Ok(value.clone()),
            _ => Err(fail()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_canonical_round_trip() {
        let wire = Value::Text("2015-01-01T00:00:00.026490Z".into());
        let imported = import_timestamp(&wire).unwrap();
        assert_eq!(
            imported,
            Value::Timestamp(
                Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap()
                    + chrono::Duration::microseconds(26_490)
            )
        );
        assert_eq!(export_timestamp(&imported).unwrap(), wire);
    }

    #[test]
    fn test_timestamp_import_is_idempotent() {
        let once = import_timestamp(&Value::Text("2014-06-21T08:00:00.000000Z".into())).unwrap();
        assert_eq!(import_timestamp(&once).unwrap(), once);
    }

    #[test]
    fn test_null_sentinel_round_trip() {
        assert_eq!(import_timestamp(&Value::Text(NULL_SENTINEL.into())).unwrap(), Value::Null);
        assert_eq!(
            export_timestamp(&Value::Null).unwrap(),
            Value::Text(NULL_SENTINEL.into())
        );
    }

    #[test]
    fn test_timestamp_rejects_garbage() {
        assert!(import_timestamp(&Value::Text("yesterday".into())).is_err());
        assert!(import_timestamp(&Value::Int(1_400_000_000)).is_err());
        assert!(export_timestamp(&Value::Int(1)).is_err());
    }

    #[test]
    fn test_narrow_timestamp_imports() {
        let narrow = Value::Bytes(b"2015-01-01T00:00:00.000000Z".to_vec());
        assert!(matches!(import_timestamp(&narrow), Ok(Value::Timestamp(_))));
    }

    #[test]
    fn test_cast_int() {
        assert_eq!(cast(ValueKind::Int, &Value::Text(" 42 ".into())).unwrap(), Value::Int(42));
        assert_eq!(cast(ValueKind::Int, &Value::Float(7.0)).unwrap(), Value::Int(7));
        assert!(cast(ValueKind::Int, &Value::Float(7.5)).is_err());
        assert!(cast(ValueKind::Int, &Value::Float(1e20)).is_err());
        assert!(cast(ValueKind::Int, &Value::Bool(true)).is_err());
    }

    #[test]
    fn test_cast_float_bool_text() {
        assert_eq!(cast(ValueKind::Float, &Value::Int(3)).unwrap(), Value::Float(3.0));
        assert_eq!(cast(ValueKind::Bool, &Value::Text("FALSE".into())).unwrap(), Value::Bool(false));
        assert_eq!(cast(ValueKind::Bool, &Value::Int(1)).unwrap(), Value::Bool(true));
        assert!(cast(ValueKind::Bool, &Value::Int(2)).is_err());
        assert_eq!(cast(ValueKind::Text, &Value::Int(12)).unwrap(), Value::Text("12".into()));
        assert_eq!(
            cast(ValueKind::Text, &Value::Bytes(b"abc".to_vec())).unwrap(),
            Value::Text("abc".into())
        );
    }

    #[test]
    fn test_cast_leaves_null_alone() {
        assert_eq!(cast(ValueKind::Int, &Value::Null).unwrap(), Value::Null);
    }
}
