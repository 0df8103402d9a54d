//! Threshold scanner - forward-only cursor over a sorted timeline
//!
//! Each scanner owns one cursor and one signed offset. An entry counts as
//! passed once `beat + offset > entry.time`. Because the timeline is sorted,
//! the first entry that has not passed bounds the scan: nothing after it can
//! have passed either.

use log::warn;

use crate::timeline::{SortedTimeline, TimedEntry};

/// One entry crossing a scanner's threshold
#[derive(Debug, Clone, Copy)]
pub struct Passage<'a> {
    /// Index of the entry in the timeline
    pub index: usize,
    pub entry: &'a TimedEntry,
    /// Discovered during a full re-scan rather than natural playback
    pub initial: bool,
}

/// Forward-only cursor that reports entries as the clock passes them
#[derive(Debug, Clone)]
pub struct ThresholdScanner {
    /// Index of the first entry not yet passed
    next_index: usize,
    /// Offset in beats added to the clock before comparing
    offset: f64,
    /// Timeline revision the cursor was last synced against
    revision: Option<u64>,
}

impl ThresholdScanner {
    pub fn new(offset: f64) -> Self {
        Self {
            next_index: 0,
            offset,
            revision: None,
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn next_index(&self) -> usize {
        self.next_index
    }

    /// Index of the last entry passed, if any
    pub fn last_passed(&self) -> Option<usize> {
        self.next_index.checked_sub(1)
    }

    /// Whether an entry at `time` is behind this scanner's threshold
    #[inline]
    pub fn has_passed(&self, time: f64, beat: f64) -> bool {
        beat + self.offset > time
    }

    /// Advance past every entry now behind the threshold.
    ///
    /// `on_pass` runs once per newly passed entry, in timeline order, only when
    /// `emit` is set. A silent scan still moves the cursor. Returns the index of
    /// the last entry passed so far.
    ///
    /// Scanning a timeline that was edited since the last scan without a
    /// [`reset`](Self::reset) would fire for shifted indices, so the cursor is
    /// silently re-synchronized first.
    pub fn scan<'a, F>(
        &mut self,
        timeline: &'a SortedTimeline,
        beat: f64,
        emit: bool,
        on_pass: F,
    ) -> Option<usize>
    where
        F: FnMut(Passage<'a>),
    {
        match self.revision {
            Some(revision) if revision != timeline.revision() => {
                warn!(
                    "timeline edited under scanner (offset {}) without a reset; resyncing silently",
                    self.offset
                );
                self.reset(timeline, beat)
            }
            _ => {
                self.revision = Some(timeline.revision());
                self.advance(timeline, beat, emit, false, on_pass)
            }
        }
    }

    /// Rewind to the start and silently catch up to `beat`
    pub fn reset(&mut self, timeline: &SortedTimeline, beat: f64) -> Option<usize> {
        self.reset_with(timeline, beat, false, |_| {})
    }

    /// Rewind to the start and catch up to `beat`, reporting passages as initial
    pub fn reset_with<'a, F>(
        &mut self,
        timeline: &'a SortedTimeline,
        beat: f64,
        emit: bool,
        on_pass: F,
    ) -> Option<usize>
    where
        F: FnMut(Passage<'a>),
    {
        self.next_index = 0;
        self.revision = Some(timeline.revision());
        self.advance(timeline, beat, emit, true, on_pass)
    }

    fn advance<'a, F>(
        &mut self,
        timeline: &'a SortedTimeline,
        beat: f64,
        emit: bool,
        initial: bool,
        mut on_pass: F,
    ) -> Option<usize>
    where
        F: FnMut(Passage<'a>),
    {
        while let Some(entry) = timeline.get(self.next_index) {
            if !self.has_passed(entry.time, beat) {
                break;
            }
            if emit {
                on_pass(Passage {
                    index: self.next_index,
                    entry,
                    initial,
                });
            }
            self.next_index += 1;
        }
        self.last_passed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::Note;

    fn timeline(times: &[f64]) -> SortedTimeline {
        SortedTimeline::from_entries(times.iter().map(|&t| TimedEntry::note(t, Note::default())))
            .unwrap()
    }

    fn scan_indices(scanner: &mut ThresholdScanner, timeline: &SortedTimeline, beat: f64) -> Vec<usize> {
        let mut passed = Vec::new();
        scanner.scan(timeline, beat, true, |p| passed.push(p.index));
        passed
    }

    #[test]
    fn test_incremental_scan() {
        let timeline = timeline(&[1.0, 3.0, 5.0]);
        let mut scanner = ThresholdScanner::new(0.0);

        assert_eq!(scan_indices(&mut scanner, &timeline, 0.0), Vec::<usize>::new());
        assert_eq!(scan_indices(&mut scanner, &timeline, 2.0), vec![0]);
        assert_eq!(scan_indices(&mut scanner, &timeline, 4.0), vec![1]);
        assert_eq!(scan_indices(&mut scanner, &timeline, 6.0), vec![2]);
        assert_eq!(scanner.last_passed(), Some(2));
    }

    #[test]
    fn test_threshold_is_strict() {
        let timeline = timeline(&[2.0]);
        let mut scanner = ThresholdScanner::new(0.0);

        // Exactly on the entry is not yet past it
        assert!(scan_indices(&mut scanner, &timeline, 2.0).is_empty());
        assert_eq!(scan_indices(&mut scanner, &timeline, 2.001), vec![0]);
    }

    #[test]
    fn test_offset_shifts_threshold() {
        let timeline = timeline(&[10.0]);
        let mut ahead = ThresholdScanner::new(2.0);
        let mut behind = ThresholdScanner::new(-2.0);

        assert_eq!(scan_indices(&mut ahead, &timeline, 8.5), vec![0]);
        assert!(scan_indices(&mut behind, &timeline, 8.5).is_empty());
        assert_eq!(scan_indices(&mut behind, &timeline, 12.5), vec![0]);
    }

    #[test]
    fn test_non_increasing_clock_fires_nothing() {
        let timeline = timeline(&[1.0, 2.0, 3.0]);
        let mut scanner = ThresholdScanner::new(0.0);

        assert_eq!(scan_indices(&mut scanner, &timeline, 2.5), vec![0, 1]);
        assert!(scan_indices(&mut scanner, &timeline, 2.5).is_empty());
        assert!(scan_indices(&mut scanner, &timeline, 0.0).is_empty());
        assert_eq!(scanner.next_index(), 2);
    }

    #[test]
    fn test_silent_scan_moves_cursor() {
        let timeline = timeline(&[1.0, 2.0, 3.0]);
        let mut scanner = ThresholdScanner::new(0.0);
        let mut fired = 0;

        let last = scanner.scan(&timeline, 2.5, false, |_| fired += 1);

        assert_eq!(fired, 0);
        assert_eq!(last, Some(1));
        assert_eq!(scan_indices(&mut scanner, &timeline, 5.0), vec![2]);
    }

    #[test]
    fn test_reset_after_seek_matches_clean_scan() {
        let timeline = timeline(&[1.0, 2.0, 4.0, 6.0, 9.0, 11.0]);
        let mut scanner = ThresholdScanner::new(0.0);
        scanner.scan(&timeline, 10.0, true, |_| {});

        let after_seek = scanner.reset(&timeline, 3.0);
        let clean = ThresholdScanner::new(0.0).scan(&timeline, 3.0, false, |_| {});

        assert_eq!(after_seek, clean);
        assert_eq!(after_seek, Some(1));
    }

    #[test]
    fn test_reset_with_reports_initial() {
        let timeline = timeline(&[1.0, 2.0]);
        let mut scanner = ThresholdScanner::new(0.0);
        let mut initial = Vec::new();

        scanner.reset_with(&timeline, 5.0, true, |p| initial.push(p.initial));

        assert_eq!(initial, vec![true, true]);
    }

    #[test]
    fn test_edit_without_reset_resyncs_silently() {
        let mut timeline = timeline(&[1.0, 3.0]);
        let mut scanner = ThresholdScanner::new(0.0);
        assert_eq!(scan_indices(&mut scanner, &timeline, 2.0), vec![0]);

        // Shift everything by inserting before the cursor
        timeline.insert(TimedEntry::note(0.5, Note::default())).unwrap();

        assert!(scan_indices(&mut scanner, &timeline, 2.0).is_empty());
        assert_eq!(scanner.next_index(), 2);
        assert_eq!(scan_indices(&mut scanner, &timeline, 4.0), vec![2]);
    }

    #[test]
    fn test_empty_timeline() {
        let timeline = SortedTimeline::new();
        let mut scanner = ThresholdScanner::new(0.0);

        assert_eq!(scanner.scan(&timeline, 100.0, true, |_| {}), None);
        assert_eq!(scanner.reset(&timeline, 100.0), None);
    }
}
