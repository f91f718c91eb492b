//! Voice crate error types.

/// Errors raised by the audio output and the playback controller handle.
///
/// Per-utterance failures are reported as
/// [`SynthesisError`](moltreader_core::SynthesisError) inside a
/// [`SpeakOutcome`](moltreader_core::SpeakOutcome) instead.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    /// Failed to open audio output stream.
    #[error("Failed to open audio output stream: {0}")]
    OutputStreamError(String),

    /// The synthesized audio could not be decoded.
    #[error("Failed to decode audio: {0}")]
    DecodeError(String),

    /// The dedicated audio thread exited unexpectedly.
    #[error("Audio thread is no longer running")]
    AudioThreadDied,

    /// The playback controller task has shut down.
    #[error("Playback controller is no longer running")]
    ControllerClosed,

    /// HTTP client construction failed.
    #[error("Failed to create HTTP client: {0}")]
    HttpClient(String),

    /// IO error (audio files, child processes).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
