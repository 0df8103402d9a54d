//! Audio-driven playback clock
//!
//! The output stream counts the frames it renders while playing; that count
//! is the song position. Metronome clicks arrive from the UI thread through a
//! ring buffer so the callback never locks or allocates.

use std::f32::consts::TAU;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::Consumer;

use beatsync::playback::PlaybackClock;

/// Click length in seconds
const CLICK_LENGTH: f32 = 0.03;

/// Metronome trigger sent to the audio callback
#[derive(Debug, Clone, Copy)]
pub struct Click {
    /// Higher pitch on bar downbeats
    pub accent: bool,
}

/// Decaying sine burst
#[derive(Default)]
struct ClickVoice {
    phase: f32,
    frequency: f32,
    remaining: f32,
}

impl ClickVoice {
    fn trigger(&mut self, click: Click) {
        self.phase = 0.0;
        self.frequency = if click.accent { 1760.0 } else { 880.0 };
        self.remaining = CLICK_LENGTH;
    }

    fn next_sample(&mut self, sample_rate: f32) -> f32 {
        if self.remaining <= 0.0 {
            return 0.0;
        }
        let envelope = self.remaining / CLICK_LENGTH;
        let sample = (self.phase * TAU).sin() * envelope * 0.3;
        self.phase = (self.phase + self.frequency / sample_rate).fract();
        self.remaining -= 1.0 / sample_rate;
        sample
    }
}

pub struct AudioClock {
    /// Keeps the stream alive
    _stream: cpal::Stream,
    frames: Arc<AtomicU64>,
    playing: Arc<AtomicBool>,
    sample_rate: f64,
}

impl AudioClock {
    /// Open the default output device, starting paused at the top of the song
    pub fn open(mut clicks: Consumer<Click>) -> EyreResult<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels() as usize;
        log::info!("audio clock at {} Hz, {} channels", sample_rate, channels);

        let frames = Arc::new(AtomicU64::new(0));
        let playing = Arc::new(AtomicBool::new(false));
        let stream_frames = frames.clone();
        let stream_playing = playing.clone();
        let mut voice = ClickVoice::default();
        let rate = sample_rate as f32;

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _| {
                    while let Ok(click) = clicks.pop() {
                        voice.trigger(click);
                    }
                    for frame in data.chunks_mut(channels) {
                        frame.fill(voice.next_sample(rate));
                    }
                    if stream_playing.load(Ordering::Acquire) {
                        stream_frames.fetch_add((data.len() / channels) as u64, Ordering::AcqRel);
                    }
                },
                |err| log::error!("audio stream error: {}", err),
                None,
            )
            .wrap_err("failed to build output stream")?;
        stream.play().wrap_err("failed to start output stream")?;

        Ok(Self {
            _stream: stream,
            frames,
            playing,
            sample_rate: sample_rate as f64,
        })
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn set_playing(&self, playing: bool) {
        self.playing.store(playing, Ordering::Release);
    }

    pub fn seek(&self, seconds: f64) {
        let frame = (seconds.max(0.0) * self.sample_rate) as u64;
        self.frames.store(frame, Ordering::Release);
    }
}

impl PlaybackClock for AudioClock {
    fn current_seconds(&self) -> f64 {
        self.frames.load(Ordering::Acquire) as f64 / self.sample_rate
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }
}
