use astrolabe::ephemeris::{GeoLocation, SwissEphemerisAdapter};
use astrolabe::lunar::{moon_phase, next_phase_events, scan_events, EventKind, MoonPhaseName};
use astrolabe::sky;
use chrono::{TimeZone, Utc};

#[test]
fn test_scan_events_finds_total_lunar_eclipse() {
    let date = Utc.with_ymd_and_hms(2022, 11, 8, 12, 0, 0).unwrap();

    let events = scan_events(&SwissEphemerisAdapter::moshier(), date);

    let lunar = events
        .iter()
        .find(|e| e.description.starts_with("Lunar Eclipse"))
        .unwrap();
    assert_eq!(lunar.kind, EventKind::Eclipse);
    assert_eq!(lunar.description, "Lunar Eclipse (total)");
    assert!((lunar.date - date).num_hours().abs() < 4);
}

#[test]
fn test_scan_events_finds_total_solar_eclipse() {
    let date = Utc.with_ymd_and_hms(2024, 4, 8, 0, 0, 0).unwrap();

    let events = scan_events(&SwissEphemerisAdapter::moshier(), date);

    assert!(events.iter().any(|e| e.description == "Solar Eclipse (total)"));
}

#[test]
fn test_scan_events_quiet_date() {
    let date = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    assert!(scan_events(&SwissEphemerisAdapter::moshier(), date).is_empty());
}

#[test]
fn test_next_phase_events_january_2024() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    let next = next_phase_events(&SwissEphemerisAdapter::moshier(), start);

    let new = next.next_new.unwrap();
    let full = next.next_full.unwrap();
    let expected_new = Utc.with_ymd_and_hms(2024, 1, 11, 11, 57, 0).unwrap();
    let expected_full = Utc.with_ymd_and_hms(2024, 1, 25, 17, 54, 0).unwrap();
    assert!((new - expected_new).num_minutes().abs() < 120);
    assert!((full - expected_full).num_minutes().abs() < 120);
}

#[test]
fn test_moon_phase_snapshot_near_full() {
    let date = Utc.with_ymd_and_hms(2024, 1, 26, 6, 0, 0).unwrap();

    let snapshot = moon_phase(&SwissEphemerisAdapter::moshier(), date).unwrap();

    assert_eq!(snapshot.name, MoonPhaseName::FullMoon);
    assert!(snapshot.illumination > 99.0);
    assert!((snapshot.age - 15.25).abs() < 0.5);
}

#[test]
fn test_sky_snapshot_all_bodies() {
    let date = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let location = GeoLocation::new(34.05, -118.24);

    let snapshot = sky::snapshot(&SwissEphemerisAdapter::moshier(), date, Some(&location));

    assert_eq!(snapshot.planets.len(), 10);
    assert!(snapshot.failed.is_empty());
    assert!(snapshot.moon_phase.is_some());
    assert!(snapshot.events.iter().all(|e| e.kind == EventKind::Horizon));
}
