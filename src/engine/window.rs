use super::ScannerId;
use crate::error::{Result, SyncError};

/// Beat range around the clock in which objects are shown
///
/// An entry is inside while `beat + despawn_offset <= time < beat + spawn_offset`.
/// The spawn scanner reports the entry entering at the leading edge, the
/// despawn scanner reports it leaving at the trailing edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityWindow {
    spawn_offset: f64,
    despawn_offset: f64,
}

impl VisibilityWindow {
    pub fn new(spawn_offset: f64, despawn_offset: f64) -> Result<Self> {
        for offset in [spawn_offset, despawn_offset] {
            if !offset.is_finite() {
                return Err(SyncError::InvalidOffset(offset));
            }
        }
        if spawn_offset < despawn_offset {
            return Err(SyncError::InvertedWindow {
                spawn: spawn_offset,
                despawn: despawn_offset,
            });
        }
        Ok(Self {
            spawn_offset,
            despawn_offset,
        })
    }

    /// Symmetric window `radius` beats either side of the clock
    pub fn around(radius: f64) -> Result<Self> {
        Self::new(radius, -radius)
    }

    pub fn spawn_offset(&self) -> f64 {
        self.spawn_offset
    }

    pub fn despawn_offset(&self) -> f64 {
        self.despawn_offset
    }

    pub fn contains(&self, time: f64, beat: f64) -> bool {
        time < beat + self.spawn_offset && time >= beat + self.despawn_offset
    }
}

/// The scanner pair bounding a [`VisibilityWindow`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowScanners {
    pub spawn: ScannerId,
    pub despawn: ScannerId,
    pub window: VisibilityWindow,
}
