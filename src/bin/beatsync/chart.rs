//! Generated demo chart

use beatsync::timeline::{MapEvent, Note, TimedEntry};

const BEATS_PER_BAR: u32 = 4;
/// Ring propagation groups cycled through by the light show
const RING_GROUPS: i32 = 5;

/// Notes on every beat, ring lights every half beat sweeping through the
/// propagation groups, back lights on each downbeat, and a tempo lift for the
/// middle third of the chart.
pub fn demo(bars: u32, bpm: f64) -> Vec<TimedEntry> {
    let beats = bars * BEATS_PER_BAR;
    let mut entries = Vec::new();

    for beat in 0..beats {
        let time = beat as f64;
        entries.push(TimedEntry::note(
            time,
            Note {
                line_index: (beat % 4) as u8,
                line_layer: ((beat / 4) % 3) as u8,
                cut_direction: (beat % 8) as u8,
            },
        ));
        if beat % BEATS_PER_BAR == 0 {
            entries.push(TimedEntry::event(time, MapEvent::new(0, 1)));
        }
    }

    // Whole-ring flash, then one group at a time
    for step in 0..beats * 2 {
        let time = step as f64 * 0.5;
        let ring = TimedEntry::event(time, MapEvent::new(MapEvent::RING_LIGHTS, 1));
        let group = step as i32 % (RING_GROUPS + 1);
        entries.push(if group == 0 { ring } else { ring.with_prop_id(group - 1) });
    }

    let third = (beats / 3) as f64;
    entries.push(TimedEntry::tempo_change(third, bpm * 1.25));
    entries.push(TimedEntry::tempo_change(third * 2.0, bpm));
    entries
}
