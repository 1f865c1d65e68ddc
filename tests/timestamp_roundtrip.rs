//! Timestamp import/export round trip.

use aiscorpus::schema::coerce::{self, TIMESTAMP};
use aiscorpus::schema::{SchemaEngine, Value, NULL_SENTINEL};
use chrono::DateTime;
use proptest::prelude::*;

#[test]
fn test_canonical_example_round_trips() {
    let wire = Value::Text("2015-01-01T00:00:00.026490Z".into());
    let imported = (TIMESTAMP.import)(&wire).unwrap();
    assert!(matches!(imported, Value::Timestamp(_)));
    assert_eq!((TIMESTAMP.export)(&imported).unwrap(), wire);
}

#[test]
fn test_null_sentinel_round_trips() {
    let wire = Value::Text(NULL_SENTINEL.into());
    let imported = (TIMESTAMP.import)(&wire).unwrap();
    assert_eq!(imported, Value::Null);
    assert_eq!((TIMESTAMP.export)(&imported).unwrap(), wire);
}

#[test]
fn test_engine_round_trip_through_message() {
    let engine = SchemaEngine::current();
    let raw = aiscorpus::schema::Message::from_json(serde_json::json!({
        "type": 1,
        "timestamp": "2016-02-29T23:59:59.999999Z"
    }))
    .unwrap();
    let imported = engine.import_values(raw.clone(), false, false).unwrap();
    let exported = engine.export_values(imported, false).unwrap();
    assert_eq!(exported, raw);
}

proptest! {
    #[test]
    fn wire_timestamps_round_trip(secs in 0i64..4_102_444_800, micros in 0u32..1_000_000) {
        let ts = DateTime::from_timestamp(secs, micros * 1000).unwrap();
        let wire = Value::Text(coerce::format_timestamp(&ts));

        let imported = (TIMESTAMP.import)(&wire).unwrap();
        prop_assert_eq!(&imported, &Value::Timestamp(ts));
        prop_assert_eq!((TIMESTAMP.export)(&imported).unwrap(), wire);
    }
}
