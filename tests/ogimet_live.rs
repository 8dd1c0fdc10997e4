/// Live ogimet checks
///
/// These hit www.ogimet.com and are marked #[ignore] so normal test runs
/// do not depend on the site being reachable.
///
/// Run with: cargo test --test ogimet_live -- --ignored

use synop_relay::ingest::ogimet::{
    BulletinSource, DEFAULT_SOURCE_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, HttpSource,
};
use synop_relay::ingest::synop::parse_bulletin;

#[test]
#[ignore] // Don't run in CI - depends on external site
fn live_bangladesh_bulletin_has_a_latest_hour() {
    let source = HttpSource::new(DEFAULT_SOURCE_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT)
        .expect("client should build");
    let text = source.fetch().expect("ogimet should respond");

    let groups = parse_bulletin(&text);
    println!("\n{} observation times, {} reports", groups.len(), groups.record_count());
    for key in groups.keys() {
        println!("   {} ({} reports)", key, groups.get(key).map_or(0, |g| g.len()));
    }

    let (key, records) = groups.latest().expect("bulletin should contain reports");
    println!("Latest: {}", key);
    assert!(!records.is_empty());
    for record in records {
        assert_eq!(record.wmo_id.len(), 5, "WMO ids are 5 digits: {:?}", record);
        assert!(!record.weather_data.is_empty());
    }
}
