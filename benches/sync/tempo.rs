//! Benchmarks for tempo-map conversion.

use std::hint::black_box;

use beatsync::timing::TempoMap;
use criterion::{BenchmarkId, Criterion};

pub fn bench_tempo(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync/tempo");

    for &changes in &[0usize, 16, 256] {
        let tempo = TempoMap::with_changes(
            120.0,
            (1..=changes).map(|i| (i as f64 * 8.0, 90.0 + (i % 7) as f64 * 15.0)),
        )
        .expect("valid tempo changes");

        group.bench_with_input(BenchmarkId::new("beats_from_seconds", changes), &changes, |b, _| {
            b.iter(|| tempo.beats_from_seconds(black_box(600.0)))
        });

        group.bench_with_input(BenchmarkId::new("seconds_from_beats", changes), &changes, |b, _| {
            b.iter(|| tempo.seconds_from_beats(black_box(1000.0)))
        });
    }

    group.finish();
}
