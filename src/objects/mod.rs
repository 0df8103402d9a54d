//! Visual-object state driven by scanner passages.

pub mod container;
pub mod propagation;

pub use container::{GridLayout, GridPosition, ObjectContainer, VisualObject, TEMPO_COLUMN};
