//! Bulletin-to-artifact integration tests
//!
//! Drive the public library API end to end against a saved ogimet page:
//! parse, select the latest hour, render, and publish to a local directory.
//! No network access is needed.

use synop_relay::analysis::groupings::derive_group_key;
use synop_relay::config::RelayConfig;
use synop_relay::ingest::synop::parse_bulletin;
use synop_relay::model::RelayError;
use synop_relay::relay;

const BANGLADESH_PAGE: &str = include_str!("fixtures/ogimet_bang.txt");

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

#[test]
fn test_fixture_groups_by_hour() {
    let groups = parse_bulletin(BANGLADESH_PAGE);

    let keys: Vec<_> = groups.keys().collect();
    assert_eq!(keys, vec!["2025-05-12_06Z", "2025-05-12_09Z"]);
    assert_eq!(groups.record_count(), 6);

    let six: Vec<_> = groups
        .get("2025-05-12_06Z")
        .unwrap()
        .iter()
        .map(|r| r.station_name.as_str())
        .collect();
    assert_eq!(six, vec!["Rangpur", "Dhaka", "Chittagong"]);
}

#[test]
fn test_fixture_multiline_reports_are_joined() {
    let groups = parse_bulletin(BANGLADESH_PAGE);
    let nine = groups.get("2025-05-12_09Z").unwrap();

    let rangpur = &nine[0];
    assert_eq!(rangpur.wmo_id, "41859");
    assert_eq!(rangpur.datetime, "2025-05-12 09:00Z");
    assert_eq!(
        rangpur.weather_data,
        "12094 41859 32960 60000 10325 20230 39990 40050 52008 60001 70022 81500"
    );

    // Dhaka's 09Z report has no terminator. It is still open when the
    // Chittagong header arrives, so it closes under that station.
    let unterminated = &nine[1];
    assert!(unterminated.weather_data.starts_with("12094 41923"));
    assert!(unterminated.weather_data.ends_with("81500 58004"));
    assert_eq!(unterminated.wmo_id, "41978");
    assert_eq!(unterminated.station_name, "Chittagong");
    assert_eq!(unterminated.latitude, "22-16N");
    assert_eq!(unterminated.longitude, "091-49E");
    assert_eq!(unterminated.elevation, "33");
}

#[test]
fn test_fixture_latest_hour() {
    let groups = parse_bulletin(BANGLADESH_PAGE);
    let (key, records) = groups.latest().expect("fixture has data");
    assert_eq!(key, "2025-05-12_09Z");
    assert_eq!(records.len(), 3);
}

#[test]
fn test_single_station_scenario() {
    let text = "\
# SYNOPS from 43279, DHAKA | 23.77N | 90.38E | 8 m
20250512 1200 AAXX 81 43279 32960 60000 10330 20260 =
";
    let groups = parse_bulletin(text);
    assert_eq!(groups.len(), 1);

    let records = groups.get("2025-05-12_12Z").expect("12Z group");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].datetime, "2025-05-12 12:00Z");
    assert_eq!(records[0].wmo_id, "43279");
    assert_eq!(records[0].station_name, "DHAKA");
    assert_eq!(records[0].latitude, "23.77N");
    assert_eq!(records[0].longitude, "90.38E");
    assert_eq!(records[0].elevation, "8");
}

#[test]
fn test_back_to_back_reports_without_terminator() {
    let text = "\
# SYNOPS from 41923, Dhaka | 23-46N | 090-23E | 9 m
202505120000 AAXX 12001 41923 32960
333 10320
202505120300 AAXX 12034 41923 31460
";
    let groups = parse_bulletin(text);
    let first = groups.get("2025-05-12_00Z").expect("first report emitted");
    assert_eq!(first[0].datetime, "2025-05-12 00:00Z");
    assert_eq!(first[0].weather_data, "12001 41923 32960 10320");
    assert!(groups.get("2025-05-12_03Z").is_some());
}

#[test]
fn test_garbage_never_fails() {
    let inputs = [
        "",
        "\n\n\n",
        "=\n=\n=",
        "333 333 333\n555\n",
        "# SYNOPS from\n20250512AAXX\n",
        "202505120000 AAXX\n=\n",
        "ünïcödé ☃ text\n202505120000 AAXX 12001 ☃☃☃",
    ];
    for input in inputs {
        let groups = parse_bulletin(input);
        assert!(groups.is_empty(), "no station header, so nothing for {:?}", input);
        assert!(groups.latest_key().is_none());
    }
}

#[test]
fn test_non_ascii_digit_start_line_is_skipped() {
    let text = "\
# SYNOPS from 41923, Dhaka | 23-46N | 090-23E | 9 m
1\u{660}\u{660}\u{660}\u{660}\u{660}\u{660}\u{660}1200 AAXX 12001 41923=
202505121200 AAXX 12121 41923 32960=
";
    let groups = parse_bulletin(text);
    let keys: Vec<_> = groups.keys().collect();
    assert_eq!(keys, vec!["2025-05-12_12Z"]);
    assert_eq!(groups.record_count(), 1);
}

#[test]
fn test_group_key_derivation() {
    assert_eq!(derive_group_key("20250512", "1230"), "2025-05-12_12Z");
}

// ---------------------------------------------------------------------------
// Full run with a file source and local publisher
// ---------------------------------------------------------------------------

fn local_config(bulletin: &std::path::Path, out: &std::path::Path) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.source.file = Some(bulletin.to_path_buf());
    config.output.local_dir = Some(out.to_path_buf());
    config.ftp.enabled = false;
    config
}

#[test]
fn test_run_writes_latest_group_locally() {
    let tmp = tempfile::tempdir().unwrap();
    let bulletin = tmp.path().join("bang.txt");
    std::fs::write(&bulletin, BANGLADESH_PAGE).unwrap();
    let out = tmp.path().join("out");

    let summary = relay::run(&local_config(&bulletin, &out)).unwrap();
    assert_eq!(summary.filename, "2025-05-12_09Z.json");
    assert_eq!(summary.record_count, 3);
    assert_eq!(summary.observation_times, 2);

    let written = std::fs::read(out.join("2025-05-12_09Z.json")).unwrap();
    assert_eq!(written.len(), summary.payload_bytes);

    let value: serde_json::Value = serde_json::from_slice(&written).unwrap();
    let stations: Vec<_> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["wmo_id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(stations, vec!["41859", "41978", "41978"]);
}

#[test]
fn test_run_with_empty_bulletin_reports_no_data() {
    let tmp = tempfile::tempdir().unwrap();
    let bulletin = tmp.path().join("empty.txt");
    std::fs::write(&bulletin, "\n   \n").unwrap();
    let out = tmp.path().join("out");

    let err = relay::run(&local_config(&bulletin, &out)).unwrap_err();
    assert!(err.is_no_data());
    assert!(!out.exists(), "nothing should be written without data");
}

#[test]
fn test_run_with_missing_bulletin_is_fetch_failure() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");

    let err = relay::run(&local_config(&tmp.path().join("missing.txt"), &out)).unwrap_err();
    assert!(matches!(err, RelayError::Fetch { .. }));
    assert!(!err.is_no_data());
}
