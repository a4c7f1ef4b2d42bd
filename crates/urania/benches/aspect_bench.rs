use criterion::{black_box, criterion_group, criterion_main, Criterion};
use urania::aspects::{AspectCalculator, AspectTable};
use urania::circuits::{build_patterns, detect_minor_links, AspectGraph};
use urania::PositionMap;

fn sample_chart(count: usize) -> PositionMap {
    (0..count)
        .map(|i| (format!("body_{}", i), (i as f64) * 37.3 % 360.0))
        .collect()
}

fn bench_calculate_aspect(c: &mut Criterion) {
    let calculator = AspectCalculator::new();
    let table = AspectTable::default();

    c.bench_function("major_aspect", |b| {
        b.iter(|| calculator.major_aspect(black_box(100.0), black_box(192.0), black_box(&table)))
    });
}

fn bench_aspect_graph(c: &mut Criterion) {
    let table = AspectTable::default();
    let positions = sample_chart(30);

    c.bench_function("aspect_graph_30", |b| {
        b.iter(|| AspectGraph::build(black_box(&positions), black_box(&table)))
    });

    let patterns = build_patterns(&positions, &table);
    c.bench_function("minor_links_30", |b| {
        b.iter(|| detect_minor_links(black_box(&positions), black_box(&patterns), black_box(&table)))
    });
}

criterion_group!(benches, bench_calculate_aspect, bench_aspect_graph);
criterion_main!(benches);
