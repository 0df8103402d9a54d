//! Timeline data: scheduled entries and the sorted sequence that owns them.

pub mod entry;
pub mod sorted;

pub use entry::{CustomData, EntryClass, EntryId, EntryKind, KindFilter, MapEvent, Note, TimedEntry};
pub use sorted::{Insertion, SortedTimeline, TimelineError};
