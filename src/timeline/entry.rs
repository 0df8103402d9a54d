use std::ops::BitOr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stable identity of an entry, assigned by the timeline on insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntryId(pub(crate) u64);

impl EntryId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A playable note placed on the lane grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Note {
    /// Horizontal lane (0 = leftmost)
    pub line_index: u8,
    /// Vertical layer (0 = bottom)
    pub line_layer: u8,
    pub cut_direction: u8,
}

/// A lighting/map event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MapEvent {
    pub event_type: i32,
    pub value: i32,
}

impl MapEvent {
    /// Event type driving the ring lights (the propagation-mode target)
    pub const RING_LIGHTS: i32 = 1;

    pub fn new(event_type: i32, value: i32) -> Self {
        Self { event_type, value }
    }

    pub fn is_ring_lights(&self) -> bool {
        self.event_type == Self::RING_LIGHTS
    }
}

/// Kind-specific payload of a timeline entry
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(tag = "kind", rename_all = "snake_case")
)]
pub enum EntryKind {
    Note(Note),
    Event(MapEvent),
    /// Tempo takes the new value from this entry's time onward
    TempoChange { bpm: f64 },
}

/// Payload-free discriminant of [`EntryKind`], used for routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryClass {
    Note,
    Event,
    TempoChange,
}

impl EntryClass {
    fn bit(self) -> u8 {
        match self {
            EntryClass::Note => 0b001,
            EntryClass::Event => 0b010,
            EntryClass::TempoChange => 0b100,
        }
    }
}

/// Set of entry classes a subscriber wants to hear about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindFilter(u8);

impl KindFilter {
    pub const NOTES: KindFilter = KindFilter(0b001);
    pub const EVENTS: KindFilter = KindFilter(0b010);
    pub const TEMPO_CHANGES: KindFilter = KindFilter(0b100);
    pub const ALL: KindFilter = KindFilter(0b111);

    pub fn contains(self, class: EntryClass) -> bool {
        self.0 & class.bit() != 0
    }
}

impl Default for KindFilter {
    fn default() -> Self {
        Self::ALL
    }
}

impl BitOr for KindFilter {
    type Output = KindFilter;

    fn bitor(self, rhs: Self) -> Self::Output {
        KindFilter(self.0 | rhs.0)
    }
}

/// Free-form per-entry attributes set by chart authors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CustomData {
    /// Ring propagation group
    #[cfg_attr(
        feature = "serde",
        serde(rename = "_propID", default, skip_serializing_if = "Option::is_none")
    )]
    pub prop_id: Option<i32>,
}

/// One scheduled object on the timeline
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimedEntry {
    #[cfg_attr(feature = "serde", serde(skip))]
    pub(crate) id: EntryId,
    /// Scheduled time in beats
    pub time: f64,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub kind: EntryKind,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "_customData", default, skip_serializing_if = "Option::is_none")
    )]
    pub custom_data: Option<CustomData>,
}

impl TimedEntry {
    pub fn new(time: f64, kind: EntryKind) -> Self {
        Self {
            id: EntryId::default(),
            time,
            kind,
            custom_data: None,
        }
    }

    pub fn note(time: f64, note: Note) -> Self {
        Self::new(time, EntryKind::Note(note))
    }

    pub fn event(time: f64, event: MapEvent) -> Self {
        Self::new(time, EntryKind::Event(event))
    }

    pub fn tempo_change(time: f64, bpm: f64) -> Self {
        Self::new(time, EntryKind::TempoChange { bpm })
    }

    /// Attach a ring propagation group
    pub fn with_prop_id(mut self, prop_id: i32) -> Self {
        self.custom_data.get_or_insert_with(CustomData::default).prop_id = Some(prop_id);
        self
    }

    /// Identity assigned by the owning timeline (default until inserted)
    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn class(&self) -> EntryClass {
        match self.kind {
            EntryKind::Note(_) => EntryClass::Note,
            EntryKind::Event(_) => EntryClass::Event,
            EntryKind::TempoChange { .. } => EntryClass::TempoChange,
        }
    }

    pub fn prop_id(&self) -> Option<i32> {
        self.custom_data.and_then(|data| data.prop_id)
    }

    /// New tempo if this is a tempo-change entry
    pub fn tempo_bpm(&self) -> Option<f64> {
        match self.kind {
            EntryKind::TempoChange { bpm } => Some(bpm),
            _ => None,
        }
    }

    pub fn is_ring_lights(&self) -> bool {
        matches!(self.kind, EntryKind::Event(event) if event.is_ring_lights())
    }

    /// Whether `other` occupies the same slot and would be replaced by this entry.
    ///
    /// Same time and same slot: lane/layer for notes, event type for events.
    /// Custom data must match too, so differently grouped ring events coexist.
    pub fn conflicts_with(&self, other: &TimedEntry) -> bool {
        if self.time != other.time || self.custom_data != other.custom_data {
            return false;
        }
        match (&self.kind, &other.kind) {
            (EntryKind::Note(a), EntryKind::Note(b)) => {
                a.line_index == b.line_index && a.line_layer == b.line_layer
            }
            (EntryKind::Event(a), EntryKind::Event(b)) => a.event_type == b.event_type,
            (EntryKind::TempoChange { .. }, EntryKind::TempoChange { .. }) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_filter() {
        let filter = KindFilter::NOTES | KindFilter::TEMPO_CHANGES;

        assert!(filter.contains(EntryClass::Note));
        assert!(filter.contains(EntryClass::TempoChange));
        assert!(!filter.contains(EntryClass::Event));
        assert!(KindFilter::default().contains(EntryClass::Event));
    }

    #[test]
    fn test_prop_id() {
        let ring = TimedEntry::event(2.0, MapEvent::new(MapEvent::RING_LIGHTS, 3)).with_prop_id(4);

        assert_eq!(ring.prop_id(), Some(4));
        assert!(ring.is_ring_lights());
        assert_eq!(TimedEntry::note(1.0, Note::default()).prop_id(), None);
    }

    #[test]
    fn test_conflicts() {
        let a = TimedEntry::event(4.0, MapEvent::new(0, 1));
        let b = TimedEntry::event(4.0, MapEvent::new(0, 5));
        let other_type = TimedEntry::event(4.0, MapEvent::new(2, 1));
        let grouped = TimedEntry::event(4.0, MapEvent::new(0, 1)).with_prop_id(1);
        let note = TimedEntry::note(4.0, Note::default());

        assert!(a.conflicts_with(&b));
        assert!(!a.conflicts_with(&other_type));
        assert!(!a.conflicts_with(&grouped));
        assert!(!a.conflicts_with(&note));
        assert!(TimedEntry::tempo_change(4.0, 100.0)
            .conflicts_with(&TimedEntry::tempo_change(4.0, 140.0)));
    }
}
