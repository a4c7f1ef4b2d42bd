use criterion::{black_box, criterion_group, criterion_main, Criterion};
use urania::circuits::{detect_shapes, AspectGraph};
use urania::{ChartAnalyzer, MemoryShapeCache, PositionMap, Settings};

fn sample_chart() -> PositionMap {
    [
        ("Sun", 0.0),
        ("Moon", 60.5),
        ("Mercury", 121.0),
        ("Venus", 179.0),
        ("Mars", 240.0),
        ("Jupiter", 92.0),
        ("Saturn", 271.0),
        ("Uranus", 150.0),
        ("Neptune", 302.0),
        ("Pluto", 208.0),
        ("Chiron", 33.0),
        ("Ceres", 2.5),
    ]
    .into_iter()
    .collect()
}

fn bench_detect_shapes(c: &mut Criterion) {
    let positions = sample_chart();
    let settings = Settings::default();
    let graph = AspectGraph::build(&positions, &settings.aspects);
    let patterns = graph.patterns(&positions);

    c.bench_function("detect_shapes_12", |b| {
        b.iter(|| {
            detect_shapes(
                black_box(&positions),
                black_box(&patterns),
                black_box(&graph),
                black_box(&settings),
            )
        })
    });
}

fn bench_dense_chart(c: &mut Criterion) {
    let positions: PositionMap = (0..40)
        .map(|i| (format!("Body{i}"), i as f64 * 9.0))
        .collect();
    let settings = Settings::default();
    let graph = AspectGraph::build(&positions, &settings.aspects);
    let patterns = graph.patterns(&positions);

    c.bench_function("detect_shapes_dense_40", |b| {
        b.iter(|| detect_shapes(&positions, &patterns, &graph, &settings))
    });
}

fn bench_chart_analysis(c: &mut Criterion) {
    let positions = sample_chart();
    let mut cached = ChartAnalyzer::default().with_cache(MemoryShapeCache::new());

    c.bench_function("analyze_cached_12", |b| {
        b.iter(|| cached.analyze(black_box(&positions), None))
    });
}

criterion_group!(benches, bench_detect_shapes, bench_dense_chart, bench_chart_analysis);
criterion_main!(benches);
