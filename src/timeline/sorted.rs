use log::trace;
use thiserror::Error;

use super::entry::{EntryId, TimedEntry};

/// Errors raised when an edit would break the timeline's invariants
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TimelineError {
    #[error("entry time must be finite, got {0}")]
    NonFiniteTime(f64),
    #[error("tempo change at beat {time} must have a finite positive BPM, got {bpm}")]
    InvalidTempoChange { time: f64, bpm: f64 },
    #[error("tempo change at beat {0} lies before the start of the song")]
    TempoChangeBeforeStart(f64),
}

/// Result of a conflict-replacing insert
#[derive(Debug, Clone, PartialEq)]
pub struct Insertion {
    /// Index of the new entry after the insert
    pub index: usize,
    pub id: EntryId,
    /// Entry that occupied the same slot and was removed
    pub replaced: Option<TimedEntry>,
}

/// Entries ordered by time, ties kept in insertion order
///
/// Every structural edit bumps [`revision`](Self::revision) so cursors into
/// the timeline can tell their indices went stale.
#[derive(Debug, Clone, Default)]
pub struct SortedTimeline {
    entries: Vec<TimedEntry>,
    next_id: u64,
    revision: u64,
}

impl SortedTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a timeline from unsorted entries (stable sort by time)
    pub fn from_entries<I>(entries: I) -> Result<Self, TimelineError>
    where
        I: IntoIterator<Item = TimedEntry>,
    {
        let mut timeline = Self::new();
        timeline.extend(entries)?;
        Ok(timeline)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TimedEntry> {
        self.entries.get(index)
    }

    pub fn as_slice(&self) -> &[TimedEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimedEntry> {
        self.entries.iter()
    }

    /// Counter bumped by every structural edit
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn index_of(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    /// `(time, bpm)` of every tempo-change entry, in timeline order
    pub fn tempo_changes(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.entries
            .iter()
            .filter_map(|entry| entry.tempo_bpm().map(|bpm| (entry.time, bpm)))
    }

    /// Insert after every entry with the same or earlier time
    pub fn insert(&mut self, mut entry: TimedEntry) -> Result<(usize, EntryId), TimelineError> {
        validate(&entry)?;
        let id = self.assign_id(&mut entry);
        let index = self.entries.partition_point(|e| e.time <= entry.time);
        self.entries.insert(index, entry);
        self.revision += 1;
        Ok((index, id))
    }

    /// Insert, first removing any entry that occupies the same slot
    pub fn insert_replacing(&mut self, entry: TimedEntry) -> Result<Insertion, TimelineError> {
        validate(&entry)?;
        let replaced = self
            .entries
            .iter()
            .position(|existing| entry.conflicts_with(existing))
            .map(|index| self.entries.remove(index));
        if let Some(old) = &replaced {
            trace!("replacing conflicting entry {:?} at beat {}", old.id, old.time);
        }
        let (index, id) = self.insert(entry)?;
        Ok(Insertion {
            index,
            id,
            replaced,
        })
    }

    /// Append many entries and restore order once
    pub fn extend<I>(&mut self, entries: I) -> Result<(), TimelineError>
    where
        I: IntoIterator<Item = TimedEntry>,
    {
        let start = self.entries.len();
        for mut entry in entries {
            if let Err(err) = validate(&entry) {
                self.entries.truncate(start);
                return Err(err);
            }
            self.assign_id(&mut entry);
            self.entries.push(entry);
        }
        if self.entries.len() > start {
            self.sort();
        }
        Ok(())
    }

    pub fn remove(&mut self, id: EntryId) -> Option<TimedEntry> {
        let index = self.index_of(id)?;
        self.remove_at(index)
    }

    pub fn remove_at(&mut self, index: usize) -> Option<TimedEntry> {
        if index >= self.entries.len() {
            return None;
        }
        self.revision += 1;
        Some(self.entries.remove(index))
    }

    /// Keep only the entries matching `keep`
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&TimedEntry) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(keep);
        if self.entries.len() != before {
            self.revision += 1;
        }
    }

    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            self.entries.clear();
            self.revision += 1;
        }
    }

    fn sort(&mut self) {
        // Stable: equal times keep insertion order
        self.entries.sort_by(|a, b| a.time.total_cmp(&b.time));
        self.revision += 1;
    }

    fn assign_id(&mut self, entry: &mut TimedEntry) -> EntryId {
        self.next_id += 1;
        entry.id = EntryId(self.next_id);
        entry.id
    }
}

impl<'a> IntoIterator for &'a SortedTimeline {
    type Item = &'a TimedEntry;
    type IntoIter = std::slice::Iter<'a, TimedEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn validate(entry: &TimedEntry) -> Result<(), TimelineError> {
    if !entry.time.is_finite() {
        return Err(TimelineError::NonFiniteTime(entry.time));
    }
    if let Some(bpm) = entry.tempo_bpm() {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(TimelineError::InvalidTempoChange {
                time: entry.time,
                bpm,
            });
        }
        if entry.time < 0.0 {
            return Err(TimelineError::TempoChangeBeforeStart(entry.time));
        }
    }
    Ok(())
}
