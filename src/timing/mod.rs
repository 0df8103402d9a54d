pub mod tempo;

pub use tempo::{TempoError, TempoMap, TempoSegment, SECONDS_PER_MINUTE};
