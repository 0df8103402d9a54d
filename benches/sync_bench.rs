//! Benchmarks for the scanners, tempo conversion and the frame driver.
//!
//! Run with: cargo bench
//!
//! A frame at 60fps leaves ~16.7ms for everything; synchronization should
//! use a tiny fraction of that even on charts with tens of thousands of
//! entries, and a seek should stay well under one frame.
//!
//! Benchmark groups:
//!   - sync/scanner  Incremental scans and full re-scans after a seek
//!   - sync/tempo    Seconds <-> beats through many tempo changes
//!   - sync/engine   Whole frames with a window and subscribed listeners

use criterion::{criterion_group, criterion_main};

mod sync;

/// Chart sizes in entries.
pub const CHART_SIZES: &[usize] = &[1_000, 10_000, 100_000];

criterion_group!(
    benches,
    sync::bench_scanner,
    sync::bench_tempo,
    sync::bench_engine,
);
criterion_main!(benches);
