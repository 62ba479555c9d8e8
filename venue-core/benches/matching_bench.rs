mod common;
use common::*;
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use venue_core::engine::snapshot::render_snapshot;
use venue_core::prelude::*;

/// Feeds 10k crossing orders through a fresh engine: 10k resting sells
/// followed by 10k buys that walk and clear them, exercising the full
/// process_order path end to end.
fn bench_matching_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("matching for 10k orders");
    group.throughput(Throughput::Elements(20_000));
    group.bench_function("process_order 10k sell + 10k buy", |b| {
        b.iter(|| {
            let mut engine = MatchingEngine::new(NullEventSink);
            for i in 0..10_000u32 {
                let price = 1000.0 + (i % 500) as f64;
                engine
                    .process_order(make_limit_order(i, Side::Sell, price, 10.0, 3_000 + i as u64))
                    .unwrap();
            }
            for i in 10_000..20_000u32 {
                engine
                    .process_order(make_limit_order(i, Side::Buy, 1500.0, 10.0, 4_000 + i as u64))
                    .unwrap();
            }
        });
    });
    group.finish();
}

/// Matching against a single deep price level, to isolate FIFO-queue
/// traversal cost from book-wide price-level lookups.
fn bench_single_level_fifo(c: &mut Criterion) {
    let mut group = c.benchmark_group("single level FIFO");
    group.throughput(Throughput::Elements(5_000));
    group.bench_function("consume 5k resting orders at one price", |b| {
        b.iter(|| {
            let mut engine = MatchingEngine::new(NullEventSink);
            for i in 0..5_000u32 {
                engine
                    .process_order(make_limit_order(i, Side::Sell, 100.0, 1.0, i as u64))
                    .unwrap();
            }
            engine
                .process_order(make_limit_order(999_999, Side::Buy, 100.0, 5_000.0, 10_000))
                .unwrap();
        });
    });
    group.finish();
}

/// Snapshot rendering cost over a book with resting orders on both sides;
/// this runs once per processed order in the `match` role's event sink,
/// so it must stay cheap.
fn bench_snapshot_rendering(c: &mut Criterion) {
    let mut engine = MatchingEngine::new(NullEventSink);
    for i in 0..1_000u32 {
        engine
            .process_order(make_limit_order(i, Side::Buy, 90.0 + (i % 50) as f64, 1.0, i as u64))
            .unwrap();
    }
    for i in 1_000..2_000u32 {
        engine
            .process_order(make_limit_order(i, Side::Sell, 150.0 + (i % 50) as f64, 1.0, i as u64))
            .unwrap();
    }

    let mut group = c.benchmark_group("snapshot rendering");
    group.throughput(Throughput::Elements(1));
    group.bench_function("render_snapshot over ~2k resting orders", |b| {
        b.iter(|| render_snapshot(engine.book()));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_matching_throughput,
    bench_single_level_fifo,
    bench_snapshot_rendering
);
criterion_main!(benches);
