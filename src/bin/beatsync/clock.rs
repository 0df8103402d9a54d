//! Clock selection for the player
//!
//! Prefers the audio stream's frame counter; falls back to a transport
//! advanced by wall time when there is no device or `--silent` is given.

use std::time::Instant;

use rtrb::Producer;

use beatsync::playback::{ClockEvent, PlaybackClock, TransportClock};

use super::audio::{AudioClock, Click};

enum Backend {
    Audio {
        clock: AudioClock,
        clicks: Producer<Click>,
    },
    Silent {
        transport: TransportClock,
        last_tick: Instant,
    },
}

pub struct PlayerClock {
    backend: Backend,
    /// Song length in seconds
    length: f64,
}

impl PlayerClock {
    pub fn audio(clock: AudioClock, clicks: Producer<Click>, length: f64) -> Self {
        Self {
            backend: Backend::Audio { clock, clicks },
            length,
        }
    }

    pub fn silent(length: f64) -> Self {
        Self {
            backend: Backend::Silent {
                transport: TransportClock::new().with_length(length),
                last_tick: Instant::now(),
            },
            length,
        }
    }

    /// Short description for the transport bar
    pub fn source(&self) -> String {
        match &self.backend {
            Backend::Audio { clock, .. } => format!("{:.1}kHz", clock.sample_rate() / 1000.0),
            Backend::Silent { .. } => "silent".to_string(),
        }
    }

    /// Move time forward; reports the pause at the end of the song
    pub fn tick(&mut self) -> Option<ClockEvent> {
        match &mut self.backend {
            Backend::Audio { clock, .. } => {
                if clock.is_playing() && clock.current_seconds() >= self.length {
                    clock.set_playing(false);
                    clock.seek(self.length);
                    return Some(ClockEvent::PlayToggled(false));
                }
                None
            }
            Backend::Silent { transport, last_tick } => {
                let now = Instant::now();
                let elapsed = now.duration_since(*last_tick).as_secs_f64();
                *last_tick = now;
                transport.advance(elapsed)
            }
        }
    }

    pub fn toggle(&mut self) -> ClockEvent {
        let playing = !self.is_playing();
        match &mut self.backend {
            Backend::Audio { clock, .. } => clock.set_playing(playing),
            Backend::Silent { transport, last_tick } => {
                *last_tick = Instant::now();
                transport.toggle();
            }
        }
        ClockEvent::PlayToggled(playing)
    }

    pub fn seek(&mut self, seconds: f64) -> ClockEvent {
        let seconds = seconds.clamp(0.0, self.length);
        match &mut self.backend {
            Backend::Audio { clock, .. } => {
                clock.seek(seconds);
                ClockEvent::PositionJumped
            }
            Backend::Silent { transport, .. } => transport.seek(seconds),
        }
    }

    /// Queue a metronome click; dropped when silent or the queue is full
    pub fn click(&mut self, click: Click) {
        if let Backend::Audio { clicks, .. } = &mut self.backend {
            if clicks.push(click).is_err() {
                log::trace!("click queue full");
            }
        }
    }
}

impl PlaybackClock for PlayerClock {
    fn current_seconds(&self) -> f64 {
        match &self.backend {
            Backend::Audio { clock, .. } => clock.current_seconds(),
            Backend::Silent { transport, .. } => transport.current_seconds(),
        }
    }

    fn is_playing(&self) -> bool {
        match &self.backend {
            Backend::Audio { clock, .. } => clock.is_playing(),
            Backend::Silent { transport, .. } => transport.is_playing(),
        }
    }
}
