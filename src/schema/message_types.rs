//! AIS message types 1 through 27

use super::types::MessageTypeSpec;

const COMMON: [&str; 3] = ["repeat", "mmsi", "timestamp"];

const CLASS_A_POSITION: [&str; 12] = [
    "status", "turn", "speed", "accuracy", "lon", "lat", "course", "heading", "second",
    "maneuver", "raim", "radio",
];

const UTC_REPORT: [&str; 11] = [
    "year", "month", "day", "hour", "minute", "second", "accuracy", "lon", "lat", "epfd", "raim",
];

const DIMENSIONS: [&str; 4] = ["to_bow", "to_stern", "to_port", "to_starboard"];

fn spec(type_id: i64, label: &str, groups: &[&[&str]]) -> MessageTypeSpec {
    let names = COMMON
        .iter()
        .chain(groups.iter().flat_map(|g| g.iter()))
        .copied();
    MessageTypeSpec::new(type_id, label, names)
}

/// The canonical message-type table.
pub(crate) fn current_types() -> Vec<MessageTypeSpec> {
    vec![
        spec(1, "Position Report Class A", &[&CLASS_A_POSITION]),
        spec(
            2,
            "Position Report Class A (Assigned schedule)",
            &[&CLASS_A_POSITION],
        ),
        spec(
            3,
            "Position Report Class A (Response to interrogation)",
            &[&CLASS_A_POSITION],
        ),
        spec(4, "Base Station Report", &[&UTC_REPORT, &["radio"]]),
        spec(
            5,
            "Static and Voyage Related Data",
            &[
                &["ais_version", "imo", "callsign", "shipname", "shiptype"],
                &DIMENSIONS,
                &["epfd", "month", "day", "hour", "minute", "draught", "destination", "dte"],
            ],
        ),
        spec(
            6,
            "Binary Addressed Message",
            &[&["seqno", "dest_mmsi", "retransmit", "dac", "fid", "data"]],
        ),
        spec(7, "Binary Acknowledge", &[&["mmsi1", "mmsi2", "mmsi3", "mmsi4"]]),
        spec(8, "Binary Broadcast Message", &[&["dac", "fid", "data"]]),
        spec(
            9,
            "Standard SAR Aircraft Position Report",
            &[&[
                "alt", "speed", "accuracy", "lon", "lat", "course", "second", "regional", "dte",
                "assigned", "raim", "radio",
            ]],
        ),
        spec(10, "UTC and Date Inquiry", &[&["dest_mmsi"]]),
        spec(11, "UTC and Date Response", &[&UTC_REPORT, &["radio"]]),
        spec(
            12,
            "Addressed Safety Related Message",
            &[&["seqno", "dest_mmsi", "retransmit", "text"]],
        ),
        spec(
            13,
            "Safety Related Acknowledgement",
            &[&["mmsi1", "mmsi2", "mmsi3", "mmsi4"]],
        ),
        spec(14, "Safety Related Broadcast Message", &[&["text"]]),
        spec(
            15,
            "Interrogation",
            &[&[
                "mmsi1", "type1_1", "offset1_1", "type1_2", "offset1_2", "mmsi2", "type2_1",
                "offset2_1",
            ]],
        ),
        spec(
            16,
            "Assignment Mode Command",
            &[&["mmsi1", "offset1", "increment1", "mmsi2", "offset2", "increment2"]],
        ),
        spec(17, "DGNSS Binary Broadcast Message", &[&["lon", "lat", "data"]]),
        spec(
            18,
            "Standard Class B CS Position Report",
            &[&[
                "speed", "accuracy", "lon", "lat", "course", "heading", "second", "regional",
                "cs", "display", "dsc", "band", "msg22", "assigned", "raim", "radio",
            ]],
        ),
        spec(
            19,
            "Extended Class B Equipment Position Report",
            &[
                &[
                    "speed", "accuracy", "lon", "lat", "course", "heading", "second", "regional",
                    "shipname", "shiptype",
                ],
                &DIMENSIONS,
                &["epfd", "raim", "dte", "assigned"],
            ],
        ),
        spec(
            20,
            "Data Link Management",
            &[&["offset1", "number1", "timeout1", "increment1"]],
        ),
        spec(
            21,
            "Aid-to-Navigation Report",
            &[
                &["aid_type", "name", "accuracy", "lon", "lat"],
                &DIMENSIONS,
                &["epfd", "second", "off_position", "regional", "raim", "virtual_aid", "assigned"],
            ],
        ),
        spec(
            22,
            "Channel Management",
            &[&[
                "channel_a", "channel_b", "txrx", "power", "ne_lon", "ne_lat", "sw_lon", "sw_lat",
                "dest_mmsi", "addressed", "band_a", "band_b", "zonesize",
            ]],
        ),
        spec(
            23,
            "Group Assignment Command",
            &[&[
                "ne_lon", "ne_lat", "sw_lon", "sw_lat", "station_type", "ship_type", "txrx",
                "interval", "quiet",
            ]],
        ),
        spec(
            24,
            "Static Data Report",
            &[
                &["partno", "shipname", "shiptype", "vendorid", "callsign"],
                &DIMENSIONS,
                &["mothership_mmsi"],
            ],
        ),
        spec(
            25,
            "Single Slot Binary Message",
            &[&["addressed", "structured", "dest_mmsi", "dac", "fid", "data"]],
        ),
        spec(
            26,
            "Multiple Slot Binary Message With Communications State",
            &[&["addressed", "structured", "dest_mmsi", "dac", "fid", "data", "radio"]],
        ),
        spec(
            27,
            "Position Report For Long-Range Applications",
            &[&["accuracy", "raim", "status", "lon", "lat", "speed", "course", "gnss"]],
        ),
    ]
}
