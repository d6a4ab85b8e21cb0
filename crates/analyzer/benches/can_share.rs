use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::path::PathBuf;
use takegrant_analyzer::{initially_spans, terminally_spans, DeciderConfig, ShareDecider};
use takegrant_core::ProtectionGraph;
use takegrant_loader::{chain, chained_id, ChainLink, GraphDocument};

const LENGTHS: [usize; 6] = [3, 6, 12, 24, 48, 86];

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn example3() -> GraphDocument {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/example3-complex-graph.json");
    GraphDocument::from_path(path).unwrap()
}

fn chained(base: &GraphDocument, length: usize) -> ProtectionGraph {
    chain(base, length, &ChainLink::default())
        .unwrap()
        .into_graph()
        .unwrap()
}

// ---------------------------------------------------------------------------
// Benchmark: can_share across chain lengths
// ---------------------------------------------------------------------------

fn bench_chain(c: &mut Criterion) {
    let base = example3();
    let decider = ShareDecider::default();

    let mut group = c.benchmark_group("can_share_chain");
    for length in LENGTHS {
        let graph = chained(&base, length);
        let (x, y) = (chained_id(0, "1"), chained_id(length - 1, "8"));
        group.bench_with_input(BenchmarkId::from_parameter(length), &graph, |b, graph| {
            b.iter(|| black_box(decider.can_share(graph, "A", &x, &y).unwrap()));
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: dedicated single-worker pool vs global pool
// ---------------------------------------------------------------------------

fn bench_workers(c: &mut Criterion) {
    let graph = chained(&example3(), 24);
    let (x, y) = (chained_id(0, "1"), chained_id(23, "8"));

    let mut group = c.benchmark_group("workers");
    let global = ShareDecider::default();
    group.bench_function("global_pool", |b| {
        b.iter(|| black_box(global.can_share(&graph, "A", &x, &y).unwrap()));
    });

    let single = ShareDecider::new(DeciderConfig::with_workers(1)).unwrap();
    group.bench_function("single_worker", |b| {
        b.iter(|| black_box(single.can_share(&graph, "A", &x, &y).unwrap()));
    });
    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: span closures on the longest chain
// ---------------------------------------------------------------------------

fn bench_spans(c: &mut Criterion) {
    let graph = chained(&example3(), 86);
    let holders: Vec<&str> = graph.nodes().iter().map(|n| n.id.as_str()).collect();

    c.bench_function("initial_span", |b| {
        b.iter(|| black_box(initially_spans(&graph, "85_4").unwrap()))
    });
    c.bench_function("terminal_span_all_nodes", |b| {
        b.iter(|| black_box(terminally_spans(&graph, holders.iter().copied()).unwrap()))
    });
}

criterion_group!(benches, bench_chain, bench_workers, bench_spans);
criterion_main!(benches);
