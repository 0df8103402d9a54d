//! Transport - an in-memory playback clock
//!
//! Advanced explicitly by elapsed wall time. Used when no audio backend
//! reports a position, and by tests.

use super::{ClockEvent, PlaybackClock};
use crate::timing::TempoMap;

/// Playback position that moves only when told to
#[derive(Debug, Clone, Default)]
pub struct TransportClock {
    /// Current position in seconds
    seconds: f64,
    /// Whether playback is active
    playing: bool,
    /// Song length in seconds; playback pauses when reaching it
    length: Option<f64>,
}

impl TransportClock {
    /// Create a paused clock at the start of the song
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop automatically at `seconds`
    pub fn with_length(mut self, seconds: f64) -> Self {
        self.length = Some(seconds);
        self
    }

    /// Move forward by `elapsed` seconds if playing.
    ///
    /// Returns `PlayToggled(false)` when the end of the song is reached.
    pub fn advance(&mut self, elapsed: f64) -> Option<ClockEvent> {
        if !self.playing {
            return None;
        }

        self.seconds += elapsed;
        match self.length {
            Some(length) if self.seconds >= length => {
                self.seconds = length;
                self.playing = false;
                Some(ClockEvent::PlayToggled(false))
            }
            _ => None,
        }
    }

    /// Jump to a position in seconds
    pub fn seek(&mut self, seconds: f64) -> ClockEvent {
        self.seconds = match self.length {
            Some(length) => seconds.clamp(0.0, length),
            None => seconds.max(0.0),
        };
        ClockEvent::PositionJumped
    }

    /// Jump to a position in beats
    pub fn seek_beat(&mut self, beat: f64, tempo: &TempoMap) -> ClockEvent {
        self.seek(tempo.seconds_from_beats(beat))
    }

    /// Reset playback to the beginning
    pub fn rewind(&mut self) -> ClockEvent {
        self.seek(0.0)
    }

    /// Start playback
    pub fn play(&mut self) -> Option<ClockEvent> {
        self.set_playing(true)
    }

    /// Pause playback
    pub fn pause(&mut self) -> Option<ClockEvent> {
        self.set_playing(false)
    }

    /// Toggle play/pause
    pub fn toggle(&mut self) -> ClockEvent {
        self.playing = !self.playing;
        ClockEvent::PlayToggled(self.playing)
    }

    fn set_playing(&mut self, playing: bool) -> Option<ClockEvent> {
        if self.playing == playing {
            return None;
        }
        self.playing = playing;
        Some(ClockEvent::PlayToggled(playing))
    }
}

impl PlaybackClock for TransportClock {
    fn current_seconds(&self) -> f64 {
        self.seconds
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_only_while_playing() {
        let mut clock = TransportClock::new();
        clock.advance(1.0);
        assert_eq!(clock.current_seconds(), 0.0);

        assert_eq!(clock.play(), Some(ClockEvent::PlayToggled(true)));
        assert_eq!(clock.play(), None);
        clock.advance(1.5);
        assert_eq!(clock.current_seconds(), 1.5);
    }

    #[test]
    fn test_stops_at_length() {
        let mut clock = TransportClock::new().with_length(2.0);
        clock.play();

        assert_eq!(clock.advance(1.0), None);
        assert_eq!(clock.advance(5.0), Some(ClockEvent::PlayToggled(false)));
        assert_eq!(clock.current_seconds(), 2.0);
        assert!(!clock.is_playing());
    }

    #[test]
    fn test_seek_and_beats() {
        let tempo = TempoMap::new(120.0).unwrap();
        let mut clock = TransportClock::new();

        assert_eq!(clock.seek_beat(8.0, &tempo), ClockEvent::PositionJumped);
        assert_eq!(clock.current_seconds(), 4.0);
        assert_eq!(clock.current_beat(&tempo), 8.0);

        clock.seek(-3.0);
        assert_eq!(clock.current_seconds(), 0.0);
    }

    #[test]
    fn test_toggle() {
        let mut clock = TransportClock::new();

        assert_eq!(clock.toggle(), ClockEvent::PlayToggled(true));
        assert_eq!(clock.toggle(), ClockEvent::PlayToggled(false));
        assert_eq!(clock.rewind(), ClockEvent::PositionJumped);
    }
}
