//! Object container - visibility state for every timeline entry
//!
//! Keeps one [`VisualObject`] per entry, index-aligned with the timeline.
//! Passages from the spawn scanner show an object, passages from the despawn
//! scanner hide it. After any full re-scan the whole set is recomputed from
//! window membership, which is the source of truth across discontinuities.

use log::trace;

use super::propagation;
use crate::engine::{Passage, ScannerId, WindowScanners};
use crate::router::{ScanContext, ScanFinished, SyncListener};
use crate::timeline::{EntryId, EntryKind, SortedTimeline, TimedEntry};

/// Grid column used for tempo-change markers, left of the event lanes
pub const TEMPO_COLUMN: f32 = -1.0;

/// Position on the editor grid; `z` runs along the time axis
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GridPosition {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Maps entries to their time-derived grid position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    /// Grid units per beat
    pub beat_spacing: f32,
}

impl GridLayout {
    pub fn new(beat_spacing: f32) -> Self {
        Self { beat_spacing }
    }

    pub fn place(&self, entry: &TimedEntry) -> GridPosition {
        let z = entry.time as f32 * self.beat_spacing;
        match entry.kind {
            EntryKind::Note(note) => GridPosition {
                x: note.line_index as f32,
                y: note.line_layer as f32,
                z,
            },
            EntryKind::Event(event) => GridPosition {
                x: event.event_type as f32 + 0.5,
                y: 0.5,
                z,
            },
            EntryKind::TempoChange { .. } => GridPosition {
                x: TEMPO_COLUMN,
                y: 0.5,
                z,
            },
        }
    }
}

/// Display state of one entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualObject {
    pub entry_id: EntryId,
    pub active: bool,
    pub position: GridPosition,
    /// Overridden opacity; `None` keeps the default appearance
    pub alpha: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct ObjectContainer {
    scanners: WindowScanners,
    layout: GridLayout,
    objects: Vec<VisualObject>,
    propagation_editing: bool,
    effective_bpm: Option<f64>,
}

impl ObjectContainer {
    pub fn new(scanners: WindowScanners, layout: GridLayout) -> Self {
        Self {
            scanners,
            layout,
            objects: Vec::new(),
            propagation_editing: false,
            effective_bpm: None,
        }
    }

    pub fn objects(&self) -> &[VisualObject] {
        &self.objects
    }

    pub fn get(&self, index: usize) -> Option<&VisualObject> {
        self.objects.get(index)
    }

    /// Indices of the objects currently shown
    pub fn active_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.objects
            .iter()
            .enumerate()
            .filter(|(_, object)| object.active)
            .map(|(index, _)| index)
    }

    /// Last tempo broadcast by the engine
    pub fn effective_bpm(&self) -> Option<f64> {
        self.effective_bpm
    }

    pub fn propagation_editing(&self) -> bool {
        self.propagation_editing
    }

    /// Switch the ring propagation display on or off
    pub fn set_propagation_editing(&mut self, enabled: bool, timeline: &SortedTimeline) {
        self.propagation_editing = enabled;
        self.apply_layout(timeline);
    }

    /// Recreate one object per entry, keeping the display mode
    pub fn rebuild(&mut self, timeline: &SortedTimeline) {
        self.objects = timeline
            .iter()
            .map(|entry| VisualObject {
                entry_id: entry.id(),
                active: false,
                position: self.layout.place(entry),
                alpha: None,
            })
            .collect();
        if self.propagation_editing {
            self.apply_layout(timeline);
        }
    }

    /// Recompute every object's visibility from window membership at `beat`
    pub fn refresh_visibility(&mut self, timeline: &SortedTimeline, beat: f64) {
        let window = self.scanners.window;
        for (object, entry) in self.objects.iter_mut().zip(timeline) {
            object.active = window.contains(entry.time, beat);
        }
    }

    fn apply_layout(&mut self, timeline: &SortedTimeline) {
        for (object, entry) in self.objects.iter_mut().zip(timeline) {
            if self.propagation_editing {
                propagation::apply(object, entry);
            } else {
                object.alpha = None;
                object.position = self.layout.place(entry);
            }
        }
    }

    fn set_active(&mut self, index: usize, active: bool) {
        match self.objects.get_mut(index) {
            Some(object) => object.active = active,
            // Index from before an edit; the resync that follows fixes it up
            None => trace!("ignoring stale object index {}", index),
        }
    }
}

impl SyncListener for ObjectContainer {
    fn on_entry_passed(&mut self, scanner: ScannerId, passage: &Passage<'_>, _ctx: &ScanContext<'_>) {
        if scanner == self.scanners.spawn {
            self.set_active(passage.index, true);
        } else if scanner == self.scanners.despawn {
            self.set_active(passage.index, false);
        }
    }

    fn on_scan_finished(&mut self, finished: &ScanFinished, ctx: &ScanContext<'_>) {
        if finished.scanner == self.scanners.spawn {
            self.refresh_visibility(ctx.timeline, ctx.beat);
        }
    }

    fn on_effective_tempo_changed(&mut self, bpm: f64) {
        self.effective_bpm = Some(bpm);
    }

    fn on_timeline_changed(&mut self, ctx: &ScanContext<'_>) {
        self.rebuild(ctx.timeline);
    }
}
