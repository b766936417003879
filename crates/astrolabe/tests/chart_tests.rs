use astrolabe::chart::{ChartEngine, ChartError};
use astrolabe::ephemeris::{Body, SwissEphemerisAdapter};
use astrolabe::western::ZodiacSign;
use chrono::{TimeZone, Utc};

#[test]
fn test_j2000_chart_end_to_end() {
    let eph = SwissEphemerisAdapter::moshier();
    let engine = ChartEngine::new(&eph);
    let instant = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();

    let chart = engine.compute_chart(instant, 0.0, 0.0).unwrap();

    assert!(chart.is_complete());
    assert_eq!(chart.bodies.len(), 5);
    let sun = chart.body(Body::Sun).unwrap();
    assert_eq!(sun.sign, ZodiacSign::Capricorn);
    assert!((sun.longitude - 280.37).abs() < 0.1);
    assert_eq!(chart.houses[0], chart.ascendant.longitude);
}

#[test]
fn test_equal_houses_are_thirty_degrees_apart() {
    let eph = SwissEphemerisAdapter::moshier();
    let engine = ChartEngine::new(&eph);
    let instant = Utc.with_ymd_and_hms(1990, 7, 15, 8, 30, 0).unwrap();

    let chart = engine.compute_chart(instant, 40.7, -74.0).unwrap();

    for i in 0..12 {
        let next = chart.houses[(i + 1) % 12];
        let gap = (next - chart.houses[i]).rem_euclid(360.0);
        assert!((gap - 30.0).abs() < 1e-9, "cusp {} gap {}", i, gap);
    }
    for placed in &chart.bodies {
        assert!((0.0..360.0).contains(&placed.placement.longitude));
        assert!((0.0..30.0).contains(&placed.placement.degree));
    }
}

#[test]
fn test_invalid_coordinates_rejected() {
    let eph = SwissEphemerisAdapter::moshier();
    let engine = ChartEngine::new(&eph);
    let instant = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();

    let err = engine.compute_chart(instant, 91.0, 0.0).unwrap_err();
    assert!(matches!(err, ChartError::InvalidCoordinates { .. }));
    assert!(engine.compute_chart(instant, 0.0, 180.5).is_err());
}

#[test]
fn test_chart_is_deterministic() {
    let eph = SwissEphemerisAdapter::moshier();
    let engine = ChartEngine::new(&eph);
    let instant = Utc.with_ymd_and_hms(1985, 3, 2, 22, 15, 0).unwrap();

    let a = engine.compute_chart(instant, 51.5, -0.12).unwrap();
    let b = engine.compute_chart(instant, 51.5, -0.12).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_require_reports_missing_bodies() {
    let eph = SwissEphemerisAdapter::moshier();
    let engine = ChartEngine::new(&eph);
    let instant = Utc.with_ymd_and_hms(2010, 5, 5, 5, 5, 0).unwrap();

    let chart = engine
        .compute_chart_for(instant, 10.0, 10.0, &[Body::Sun, Body::Moon])
        .unwrap();
    assert!(chart.require(&[Body::Sun]).is_ok());
    match chart.require(&[Body::Sun, Body::Jupiter]) {
        Err(ChartError::MissingBodies { bodies }) => assert_eq!(bodies, vec![Body::Jupiter]),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_retrograde_flag_matches_speed() {
    let eph = SwissEphemerisAdapter::moshier();
    let engine = ChartEngine::new(&eph);
    let instant = Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap();

    let mars = engine.body_position(Body::Mars, instant).unwrap();
    assert!(mars.speed < 0.0);
    assert!(mars.retrograde);

    let sun = engine.body_position(Body::Sun, instant).unwrap();
    assert!(!sun.retrograde);
    assert!((sun.speed - 1.0).abs() < 0.05);
}
