//! AIS field table
//!
//! Names follow the gpsd JSON convention. A field with a default is required
//! unless marked optional; `type`, `mmsi` and `timestamp` have no sane
//! default and are therefore never required by the completeness check.

use super::coerce;
use super::types::{Domain, FieldSpec, ValueKind};
use super::value::Value;

const MAX_MMSI: f64 = 999_999_999.0;

/// 20 characters of AIS "no name" padding.
const BLANK_NAME: &str = "@@@@@@@@@@@@@@@@@@@@";

fn ascii_text(value: &Value) -> bool {
    match value {
        Value::Text(s) => s.is_ascii(),
        Value::Bytes(b) => b.is_ascii(),
        _ => false,
    }
}

fn ascii_max(n: usize) -> Domain {
    Domain::AllOf(vec![
        Domain::MaxLength(n),
        Domain::Custom {
            name: "ascii",
            test: ascii_text,
        },
    ])
}

fn uint(max: f64, default: i64) -> FieldSpec {
    FieldSpec::int()
        .default_value(default)
        .domain(Domain::range(0.0, max))
}

fn flag(default: bool) -> FieldSpec {
    FieldSpec::boolean().default_value(default)
}

fn mmsi_ref() -> FieldSpec {
    uint(MAX_MMSI, 0)
}

/// The canonical field table.
pub(crate) fn current_fields() -> Vec<(&'static str, FieldSpec)> {
    vec![
        // Present in every message type
        ("type", FieldSpec::int().domain(Domain::range(1.0, 27.0))),
        ("repeat", uint(3.0, 0)),
        ("mmsi", FieldSpec::int().domain(Domain::range(0.0, MAX_MMSI))),
        (
            "timestamp",
            FieldSpec::new(ValueKind::Timestamp).coercion(coerce::TIMESTAMP),
        ),
        // Position reports
        ("status", uint(15.0, 15)),
        (
            "turn",
            FieldSpec::float()
                .default_value(-128.0)
                .domain(Domain::range(-128.0, 127.0)),
        ),
        (
            "speed",
            FieldSpec::float()
                .default_value(102.3)
                .domain(Domain::range(0.0, 1023.0)),
        ),
        ("accuracy", flag(false)),
        (
            "lon",
            FieldSpec::float()
                .default_value(181.0)
                .domain(Domain::range_or(-180.0, 180.0, 181.0)),
        ),
        (
            "lat",
            FieldSpec::float()
                .default_value(91.0)
                .domain(Domain::range_or(-90.0, 90.0, 91.0)),
        ),
        (
            "course",
            FieldSpec::float()
                .default_value(360.0)
                .domain(Domain::range_or(0.0, 360.0, 511.0)),
        ),
        (
            "heading",
            FieldSpec::int()
                .default_value(511)
                .domain(Domain::range_or(0.0, 359.0, 511.0)),
        ),
        ("second", uint(63.0, 60)),
        ("maneuver", uint(2.0, 0)),
        ("raim", flag(false)),
        ("radio", uint(1_048_575.0, 0).nullable()),
        // Base station / UTC report
        ("year", uint(9999.0, 0)),
        ("month", uint(12.0, 0)),
        ("day", uint(31.0, 0)),
        ("hour", uint(24.0, 24)),
        ("minute", uint(60.0, 60)),
        ("epfd", uint(15.0, 0)),
        // Static and voyage data
        ("ais_version", uint(3.0, 0)),
        ("imo", uint(1_073_741_823.0, 0)),
        (
            "callsign",
            FieldSpec::text().default_value("@@@@@@@").domain(ascii_max(7)),
        ),
        (
            "shipname",
            FieldSpec::text()
                .default_value(BLANK_NAME)
                .domain(Domain::MaxLength(20)),
        ),
        ("shiptype", uint(99.0, 0)),
        ("to_bow", uint(511.0, 0)),
        ("to_stern", uint(511.0, 0)),
        ("to_port", uint(63.0, 0)),
        ("to_starboard", uint(63.0, 0)),
        (
            "draught",
            FieldSpec::float()
                .default_value(0.0)
                .domain(Domain::range(0.0, 25.5)),
        ),
        (
            "destination",
            FieldSpec::text()
                .default_value(BLANK_NAME)
                .domain(Domain::MaxLength(20)),
        ),
        ("dte", flag(false)),
        // Addressed and binary messages
        ("seqno", uint(3.0, 0)),
        ("dest_mmsi", mmsi_ref()),
        ("retransmit", flag(false)),
        ("dac", uint(1023.0, 1)),
        ("fid", uint(63.0, 0)),
        ("data", FieldSpec::new(ValueKind::List).nullable()),
        ("addressed", flag(false)),
        ("structured", flag(false)),
        (
            "text",
            FieldSpec::text()
                .default_value("")
                .domain(Domain::MaxLength(161)),
        ),
        // Acknowledgements, interrogation, assignment
        ("mmsi1", mmsi_ref()),
        ("mmsi2", mmsi_ref().optional()),
        ("mmsi3", mmsi_ref().optional()),
        ("mmsi4", mmsi_ref().optional()),
        ("type1_1", uint(27.0, 0)),
        ("offset1_1", uint(4095.0, 0)),
        ("type1_2", uint(27.0, 0).optional()),
        ("offset1_2", uint(4095.0, 0).optional()),
        ("type2_1", uint(27.0, 0).optional()),
        ("offset2_1", uint(4095.0, 0).optional()),
        ("offset1", uint(4095.0, 0)),
        ("increment1", uint(1023.0, 0)),
        ("offset2", uint(4095.0, 0).optional()),
        ("increment2", uint(1023.0, 0).optional()),
        ("number1", uint(15.0, 0)),
        ("timeout1", uint(7.0, 0)),
        // SAR aircraft
        ("alt", uint(4095.0, 4095)),
        ("assigned", flag(false)),
        ("regional", uint(255.0, 0)),
        // Class B
        ("cs", flag(false)),
        ("display", flag(false)),
        ("dsc", flag(false)),
        ("band", flag(false)),
        ("msg22", flag(false)),
        ("partno", uint(1.0, 0)),
        (
            "vendorid",
            FieldSpec::text().default_value("@@@").domain(ascii_max(7)),
        ),
        ("mothership_mmsi", mmsi_ref().optional()),
        // Aid to navigation
        ("aid_type", uint(31.0, 0)),
        (
            "name",
            FieldSpec::text()
                .default_value(BLANK_NAME)
                .domain(Domain::MaxLength(34)),
        ),
        ("off_position", flag(false)),
        ("virtual_aid", flag(false)),
        // Channel management and group assignment
        ("channel_a", uint(4095.0, 2087)),
        ("channel_b", uint(4095.0, 2088)),
        ("txrx", uint(3.0, 0)),
        ("power", flag(false)),
        ("band_a", flag(false)),
        ("band_b", flag(false)),
        ("zonesize", uint(7.0, 0)),
        ("ne_lon", FieldSpec::float().domain(Domain::range(-180.0, 180.0))),
        ("ne_lat", FieldSpec::float().domain(Domain::range(-90.0, 90.0))),
        ("sw_lon", FieldSpec::float().domain(Domain::range(-180.0, 180.0))),
        ("sw_lat", FieldSpec::float().domain(Domain::range(-90.0, 90.0))),
        ("station_type", uint(15.0, 0)),
        ("ship_type", uint(99.0, 0)),
        ("interval", uint(15.0, 0)),
        ("quiet", uint(15.0, 0)),
        // Long-range position report
        ("gnss", flag(false)),
    ]
}
