use astrolabe::aspects::{find_aspects, AspectCalculator, AspectPoint, SynastryReport};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn chart_points(offset: f64) -> Vec<AspectPoint> {
    ["Sun", "Moon", "Mercury", "Venus", "Mars", "Jupiter", "Saturn"]
        .iter()
        .enumerate()
        .map(|(i, name)| AspectPoint::new(*name, (offset + i as f64 * 37.0) % 360.0))
        .collect()
}

fn bench_calculate_aspect(c: &mut Criterion) {
    let calculator = AspectCalculator::new();

    c.bench_function("calculate_aspect", |b| {
        b.iter(|| calculator.calculate_aspect(black_box(100.0), black_box(102.0)))
    });
}

fn bench_find_aspects_cross(c: &mut Criterion) {
    let natal = chart_points(0.0);
    let transiting = chart_points(13.0);

    c.bench_function("find_aspects_cross", |b| {
        b.iter(|| find_aspects(black_box(&transiting), Some(black_box(&natal))))
    });
}

fn bench_synastry_report(c: &mut Criterion) {
    let person1 = chart_points(0.0);
    let person2 = chart_points(200.0);

    c.bench_function("synastry_report", |b| {
        b.iter(|| SynastryReport::new(black_box(&person1), black_box(&person2)))
    });
}

criterion_group!(benches, bench_calculate_aspect, bench_find_aspects_cross, bench_synastry_report);
criterion_main!(benches);
