//! Beat-threshold scanning and tempo mapping for chart editor playback.

pub mod config;
pub mod engine; // Scanners and the frame driver
pub mod error;
pub mod objects; // Visibility state of visual objects
pub mod playback;
pub mod router;
pub mod timeline;
pub mod timing; // Seconds <-> beats

pub use config::SyncConfig;
pub use engine::SyncEngine;
pub use error::{Result, SyncError};
