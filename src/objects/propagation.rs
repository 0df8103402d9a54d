//! Ring propagation display mode.
//!
//! While enabled, ring-light events are laid out by their propagation group
//! instead of their event type, and everything else is hidden. The time axis
//! (`z`) is left untouched.

use super::container::VisualObject;
use crate::timeline::TimedEntry;

/// Column given to hidden objects, left of group 0
const HIDDEN_COLUMN: i32 = -1;

/// Propagation group of an entry, if it takes part in the mode.
///
/// Ring-light events map `prop_id` `n` to group `n + 1`; without a `prop_id`
/// they sit in group 0 (the whole ring).
pub fn group(entry: &TimedEntry) -> Option<i32> {
    if !entry.is_ring_lights() {
        return None;
    }
    Some(entry.prop_id().map_or(0, |prop_id| prop_id + 1))
}

/// Reposition or hide one object for the propagation mode
pub fn apply(object: &mut VisualObject, entry: &TimedEntry) {
    let column = match group(entry) {
        Some(group) => {
            object.alpha = None;
            group
        }
        None => {
            object.alpha = Some(0.0);
            HIDDEN_COLUMN
        }
    };
    object.position.x = column as f32 + 0.5;
    object.position.y = 0.5;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ScannerId, VisibilityWindow, WindowScanners};
    use crate::objects::{GridLayout, GridPosition, ObjectContainer};
    use crate::timeline::{MapEvent, Note, SortedTimeline};

    fn ring(time: f64) -> TimedEntry {
        TimedEntry::event(time, MapEvent::new(MapEvent::RING_LIGHTS, 1))
    }

    #[test]
    fn test_groups() {
        assert_eq!(group(&ring(1.0)), Some(0));
        assert_eq!(group(&ring(1.0).with_prop_id(0)), Some(1));
        assert_eq!(group(&ring(1.0).with_prop_id(6)), Some(7));
        assert_eq!(group(&TimedEntry::event(1.0, MapEvent::new(0, 1))), None);
        assert_eq!(group(&TimedEntry::note(1.0, Note::default())), None);
    }

    #[test]
    fn test_mode_round_trip() {
        let timeline = SortedTimeline::from_entries([
            ring(1.0).with_prop_id(2),
            TimedEntry::event(2.0, MapEvent::new(0, 1)),
            ring(3.0),
        ])
        .unwrap();
        let scanners = WindowScanners {
            spawn: ScannerId(0),
            despawn: ScannerId(1),
            window: VisibilityWindow::around(1.0).unwrap(),
        };
        let mut container = ObjectContainer::new(scanners, GridLayout::new(2.0));
        container.rebuild(&timeline);
        let original: Vec<_> = container.objects().to_vec();

        container.set_propagation_editing(true, &timeline);
        let objects = container.objects();
        assert_eq!(objects[0].position, GridPosition { x: 3.5, y: 0.5, z: 2.0 });
        assert_eq!(objects[0].alpha, None);
        assert_eq!(objects[1].position.x, -0.5);
        assert_eq!(objects[1].alpha, Some(0.0));
        assert_eq!(objects[2].position.x, 0.5);

        // Survives a rebuild after an edit
        container.rebuild(&timeline);
        assert_eq!(container.objects()[1].alpha, Some(0.0));

        container.set_propagation_editing(false, &timeline);
        assert_eq!(container.objects(), original.as_slice());
    }
}
