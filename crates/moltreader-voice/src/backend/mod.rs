//! Speech synthesis backends.
//!
//! Both implement [`SpeechSynthesizer`](moltreader_core::SpeechSynthesizer);
//! which one runs is decided once, when the controller is built.
//!
//! - [`BufferedSynthesizer`]: a [`SpeechEngine`](moltreader_core::SpeechEngine)
//!   returns encoded audio which is played locally through an [`AudioOutput`].
//! - [`CommandSynthesizer`]: an external command (`say`, `espeak-ng`)
//!   synthesizes and plays in one step.

mod buffered;
mod command;
mod http_engine;

pub use buffered::{AudioOutput, BufferedSynthesizer};
pub use command::{CommandSynthesizer, VoiceCommand, parse_say_voices};
pub use http_engine::{HttpEngineConfig, HttpSpeechEngine};
