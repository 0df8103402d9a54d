//! Benchmarks for whole engine frames.

use std::cell::RefCell;
use std::hint::black_box;
use std::rc::Rc;

use beatsync::objects::{GridLayout, ObjectContainer};
use beatsync::playback::{PlaybackClock, TransportClock};
use beatsync::router::Subscription;
use beatsync::{SyncConfig, SyncEngine};
use criterion::{BenchmarkId, Criterion};

use super::dense_chart;
use crate::CHART_SIZES;

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync/engine");

    for &size in CHART_SIZES {
        let config = SyncConfig::new().bpm(120.0);
        let mut engine = SyncEngine::from_config(&config).expect("valid config");
        let window = engine.window().expect("window from config");
        let objects = Rc::new(RefCell::new(ObjectContainer::new(
            window,
            GridLayout::new(config.beat_spacing),
        )));
        engine.subscribe(
            Subscription::all().scanner(window.spawn).scanner(window.despawn),
            objects.clone(),
        );

        let mut clock = TransportClock::new();
        let chart = dense_chart(size);
        engine
            .edit(&clock, |timeline| timeline.extend(chart.iter().cloned()))
            .expect("valid chart")
            .expect("valid chart");
        let length = engine.tempo_map().seconds_from_beats(size as f64 * 0.25);
        clock.play();

        // 60fps playback
        group.bench_with_input(BenchmarkId::new("frame", size), &size, |b, _| {
            b.iter(|| {
                if clock.advance(1.0 / 60.0).is_some() || clock.current_seconds() >= length {
                    clock.seek(0.0);
                    engine.resync(&clock);
                }
                black_box(engine.frame(&clock))
            })
        });

        // Seek: every scanner rewinds and the container recomputes visibility
        group.bench_with_input(BenchmarkId::new("seek", size), &size, |b, _| {
            b.iter(|| {
                let event = clock.seek(black_box(length / 2.0));
                engine.handle_clock_event(event, &clock);
            })
        });
    }

    group.finish();
}
