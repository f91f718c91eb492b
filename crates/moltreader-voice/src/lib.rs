//! Playback controller and speech synthesis backends for moltreader.
//!
//! - [`PlaybackController`]: the play/pause/skip/stop state machine that
//!   walks a segment queue, assigning voices and emitting progress events.
//! - [`backend`]: the buffered (engine + local audio output) and direct
//!   (external command) implementations of
//!   [`SpeechSynthesizer`](moltreader_core::SpeechSynthesizer).
//! - [`AudioThreadHandle`]: the `Send + Sync` proxy to the rodio output
//!   thread.

pub mod audio_thread;
pub mod backend;
pub mod controller;
pub mod error;
pub mod events;
pub mod playback;

// Re-export key types for convenience
pub use audio_thread::AudioThreadHandle;
pub use backend::{
    AudioOutput, BufferedSynthesizer, CommandSynthesizer, HttpEngineConfig, HttpSpeechEngine,
    VoiceCommand,
};
pub use controller::{ControllerConfig, PlaybackController};
pub use error::VoiceError;
pub use events::{FINISHED_MESSAGE, PlaybackEvent, PlaybackState, PlaybackStatus, ProgressUpdate};
