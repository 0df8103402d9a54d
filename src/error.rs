use thiserror::Error;

use crate::timeline::TimelineError;
use crate::timing::TempoError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    #[error(transparent)]
    Tempo(#[from] TempoError),

    #[error(transparent)]
    Timeline(#[from] TimelineError),

    #[error("visibility window is inverted: spawn offset {spawn} is behind despawn offset {despawn}")]
    InvertedWindow { spawn: f64, despawn: f64 },

    #[error("scanner offset must be finite, got {0}")]
    InvalidOffset(f64),
}

pub type Result<T, E = SyncError> = std::result::Result<T, E>;
