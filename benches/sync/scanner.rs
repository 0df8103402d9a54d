//! Benchmarks for the threshold scanner.

use std::hint::black_box;

use beatsync::engine::ThresholdScanner;
use criterion::{BenchmarkId, Criterion};

use super::dense_chart;
use crate::CHART_SIZES;

pub fn bench_scanner(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync/scanner");

    for &size in CHART_SIZES {
        let timeline = dense_chart(size);
        let end = size as f64 * 0.25;

        // One frame's worth of progress (a handful of passages)
        let mut scanner = ThresholdScanner::new(2.0);
        let mut beat = 0.0;
        group.bench_with_input(BenchmarkId::new("frame", size), &size, |b, _| {
            b.iter(|| {
                beat += 1.0 / 30.0;
                if beat > end {
                    beat = 0.0;
                    scanner.reset(&timeline, beat);
                }
                scanner.scan(black_box(&timeline), black_box(beat), true, |passage| {
                    black_box(passage.index);
                })
            })
        });

        // Seek to the end of the chart: silent catch-up from index 0
        let mut scanner = ThresholdScanner::new(2.0);
        group.bench_with_input(BenchmarkId::new("reset_to_end", size), &size, |b, _| {
            b.iter(|| scanner.reset(black_box(&timeline), black_box(end)))
        });

        // Paused clock: nothing new passes
        let mut scanner = ThresholdScanner::new(0.0);
        scanner.reset(&timeline, end / 2.0);
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| scanner.scan(black_box(&timeline), black_box(end / 2.0), true, |_| {}))
        });
    }

    group.finish();
}
