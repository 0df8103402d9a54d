//! Playback clock interface.
//!
//! The clock is owned outside the engine (usually by the audio backend). The
//! engine reads it once per frame and is told about discontinuities through
//! [`ClockEvent`]s.

pub mod transport;

use crate::timing::TempoMap;

pub use transport::TransportClock;

/// Source of the current song position
pub trait PlaybackClock {
    /// Song position in seconds
    fn current_seconds(&self) -> f64;

    fn is_playing(&self) -> bool;

    /// Song position in beats under the given tempo map
    fn current_beat(&self, tempo: &TempoMap) -> f64 {
        tempo.beats_from_seconds(self.current_seconds())
    }
}

/// Discontinuities the engine must re-synchronize after
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// Playback started (`true`) or paused (`false`)
    PlayToggled(bool),
    /// Position moved other than by playing forward
    PositionJumped,
}
