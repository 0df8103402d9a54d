//! Engine configuration, built fluently.
//!
//! ```
//! use beatsync::{SyncConfig, SyncEngine};
//!
//! let config = SyncConfig::new().bpm(150.0).window(6.0, -1.0);
//! let engine = SyncEngine::from_config(&config).unwrap();
//! assert_eq!(engine.tempo_map().base_bpm(), 150.0);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_BPM: f64 = 120.0;
pub const DEFAULT_SPAWN_OFFSET: f64 = 4.0;
pub const DEFAULT_DESPAWN_OFFSET: f64 = -0.5;
pub const DEFAULT_BEAT_SPACING: f32 = 4.0;
pub const DEFAULT_MESSAGE_CAPACITY: usize = 1024;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct SyncConfig {
    /// Song tempo before any tempo change
    pub bpm: f64,
    /// Beats ahead of the clock at which objects appear
    pub spawn_offset: f64,
    /// Beats relative to the clock at which objects disappear (usually negative)
    pub despawn_offset: f64,
    /// Grid units per beat along the time axis
    pub beat_spacing: f32,
    /// Ring buffer size for channel listeners
    pub message_capacity: usize,
}

impl SyncConfig {
    pub fn new() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            spawn_offset: DEFAULT_SPAWN_OFFSET,
            despawn_offset: DEFAULT_DESPAWN_OFFSET,
            beat_spacing: DEFAULT_BEAT_SPACING,
            message_capacity: DEFAULT_MESSAGE_CAPACITY,
        }
    }

    /// Set the base tempo in beats per minute
    pub fn bpm(mut self, bpm: f64) -> Self {
        self.bpm = bpm;
        self
    }

    /// Set the spawn/despawn offsets of the visibility window
    pub fn window(mut self, spawn_offset: f64, despawn_offset: f64) -> Self {
        self.spawn_offset = spawn_offset;
        self.despawn_offset = despawn_offset;
        self
    }

    pub fn beat_spacing(mut self, beat_spacing: f32) -> Self {
        self.beat_spacing = beat_spacing;
        self
    }

    pub fn message_capacity(mut self, capacity: usize) -> Self {
        self.message_capacity = capacity;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}
