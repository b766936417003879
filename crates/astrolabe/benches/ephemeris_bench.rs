use astrolabe::chart::ChartEngine;
use astrolabe::ephemeris::{AstroTime, Body, Ephemeris, SwissEphemerisAdapter};
use astrolabe::lunar::next_phase_events;
use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_geo_vector(c: &mut Criterion) {
    let eph = SwissEphemerisAdapter::moshier();
    let time = AstroTime::from_ut(8_800.0);

    c.bench_function("geo_vector_moon", |b| {
        b.iter(|| eph.geo_vector(black_box(Body::Moon), black_box(&time)))
    });
}

fn bench_compute_chart(c: &mut Criterion) {
    let eph = SwissEphemerisAdapter::moshier();
    let engine = ChartEngine::new(&eph);
    let instant = Utc.with_ymd_and_hms(1990, 6, 15, 12, 0, 0).unwrap();

    c.bench_function("compute_chart", |b| {
        b.iter(|| engine.compute_chart(black_box(instant), black_box(40.7), black_box(-74.0)))
    });
}

fn bench_next_phase_events(c: &mut Criterion) {
    let eph = SwissEphemerisAdapter::moshier();
    let instant = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    c.bench_function("next_phase_events", |b| {
        b.iter(|| next_phase_events(&eph, black_box(instant)))
    });
}

criterion_group!(benches, bench_geo_vector, bench_compute_chart, bench_next_phase_events);
criterion_main!(benches);
