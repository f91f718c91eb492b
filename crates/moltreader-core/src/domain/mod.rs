//! Domain types.
//!
//! Pure data and the voice assignment policy. Nothing in here performs I/O.

mod segment;
mod voice;

pub use segment::Segment;
pub use voice::{Voice, VoiceAssigner, VoiceAssignments, VoicePool, VoicePoolError};
