//! Benchmarks for the synchronization core.

mod engine;
mod scanner;
mod tempo;

pub use engine::bench_engine;
pub use scanner::bench_scanner;
pub use tempo::bench_tempo;

use beatsync::timeline::{Note, SortedTimeline, TimedEntry};

/// Four notes per beat
pub fn dense_chart(entries: usize) -> SortedTimeline {
    SortedTimeline::from_entries(
        (0..entries).map(|i| TimedEntry::note(i as f64 * 0.25, Note::default())),
    )
    .expect("finite times")
}
