//! Piecewise-linear conversion between seconds and beats.
//!
//! A [`TempoMap`] is built from a base tempo plus a list of tempo changes
//! positioned in beats. Each change starts a new segment that runs at its own
//! BPM until the next change. The map is immutable: rebuild it whenever the
//! tempo-change entries on the timeline are edited.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::timeline::SortedTimeline;

/// Seconds in one minute, the unit BPM is expressed against
pub const SECONDS_PER_MINUTE: f64 = 60.0;

/// One constant-tempo stretch of the song
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TempoSegment {
    /// Beat at which this tempo takes effect
    pub start_beat: f64,
    /// Tempo in beats per minute
    pub bpm: f64,
}

impl TempoSegment {
    pub fn new(start_beat: f64, bpm: f64) -> Self {
        Self { start_beat, bpm }
    }

    /// Seconds taken by `beats` beats at this segment's tempo
    #[inline]
    fn seconds_for(&self, beats: f64) -> f64 {
        beats * SECONDS_PER_MINUTE / self.bpm
    }

    /// Beats covered by `seconds` seconds at this segment's tempo
    #[inline]
    fn beats_for(&self, seconds: f64) -> f64 {
        seconds * self.bpm / SECONDS_PER_MINUTE
    }
}

/// Errors raised while building a tempo map
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TempoError {
    #[error("tempo must be finite and positive, got {0} BPM")]
    InvalidTempo(f64),
    #[error("tempo change position must be finite and non-negative, got beat {0}")]
    InvalidPosition(f64),
}

/// Seconds ↔ beats conversion over an ordered list of tempo segments
#[derive(Debug, Clone, PartialEq)]
pub struct TempoMap {
    base_bpm: f64,
    /// Always non-empty; `segments[0].start_beat == 0.0`
    segments: Vec<TempoSegment>,
    /// Song time in seconds at which each segment starts (parallel to `segments`)
    start_seconds: Vec<f64>,
}

impl TempoMap {
    /// Map with a single tempo for the whole song
    pub fn new(base_bpm: f64) -> Result<Self, TempoError> {
        Self::with_changes(base_bpm, std::iter::empty())
    }

    /// Build a map from a base tempo and `(start_beat, bpm)` changes.
    ///
    /// Changes may arrive in any order. They are stable-sorted by position and
    /// duplicates at the same beat collapse to the last one given. A change at
    /// beat 0 replaces the base tempo.
    pub fn with_changes<I>(base_bpm: f64, changes: I) -> Result<Self, TempoError>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        validate_bpm(base_bpm)?;

        let mut sorted = Vec::new();
        for (start_beat, bpm) in changes {
            if !start_beat.is_finite() || start_beat < 0.0 {
                return Err(TempoError::InvalidPosition(start_beat));
            }
            validate_bpm(bpm)?;
            sorted.push(TempoSegment::new(start_beat, bpm));
        }
        sorted.sort_by(|a, b| a.start_beat.total_cmp(&b.start_beat));

        let mut segments = vec![TempoSegment::new(0.0, base_bpm)];
        for segment in sorted {
            match segments.last_mut() {
                Some(last) if last.start_beat == segment.start_beat => *last = segment,
                _ => segments.push(segment),
            }
        }

        let mut start_seconds = Vec::with_capacity(segments.len());
        let mut elapsed = 0.0;
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                let previous = &segments[i - 1];
                elapsed += previous.seconds_for(segment.start_beat - previous.start_beat);
            }
            start_seconds.push(elapsed);
        }

        Ok(Self {
            base_bpm,
            segments,
            start_seconds,
        })
    }

    /// Build a map from the tempo-change entries currently on a timeline
    pub fn from_timeline(base_bpm: f64, timeline: &SortedTimeline) -> Result<Self, TempoError> {
        Self::with_changes(base_bpm, timeline.tempo_changes())
    }

    /// Song tempo before any change applies
    pub fn base_bpm(&self) -> f64 {
        self.base_bpm
    }

    /// Normalized segments, starting with the one anchored at beat 0
    pub fn segments(&self) -> &[TempoSegment] {
        &self.segments
    }

    /// Convert a song position in seconds to beats
    pub fn beats_from_seconds(&self, seconds: f64) -> f64 {
        let i = self
            .start_seconds
            .partition_point(|&start| start <= seconds)
            .saturating_sub(1);
        let segment = &self.segments[i];
        segment.start_beat + segment.beats_for(seconds - self.start_seconds[i])
    }

    /// Convert a song position in beats to seconds
    pub fn seconds_from_beats(&self, beats: f64) -> f64 {
        let i = self.segment_index_at_beat(beats);
        let segment = &self.segments[i];
        self.start_seconds[i] + segment.seconds_for(beats - segment.start_beat)
    }

    /// Tempo in effect at the given beat
    pub fn bpm_at_beat(&self, beats: f64) -> f64 {
        self.segments[self.segment_index_at_beat(beats)].bpm
    }

    /// Tempo in effect at the given song time
    pub fn bpm_at_seconds(&self, seconds: f64) -> f64 {
        self.bpm_at_beat(self.beats_from_seconds(seconds))
    }

    fn segment_index_at_beat(&self, beats: f64) -> usize {
        self.segments
            .partition_point(|segment| segment.start_beat <= beats)
            .saturating_sub(1)
    }
}

fn validate_bpm(bpm: f64) -> Result<(), TempoError> {
    if bpm.is_finite() && bpm > 0.0 {
        Ok(())
    } else {
        Err(TempoError::InvalidTempo(bpm))
    }
}
