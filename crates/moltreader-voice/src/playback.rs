//! Audio playback via `rodio`.
//!
//! Lives on the audio thread only: `rodio::OutputStream` is `!Send`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use crate::error::VoiceError;

/// Plays one audio file at a time on the default output device.
pub struct AudioPlayback {
    /// rodio output stream (must be kept alive).
    _stream: OutputStream,

    /// Handle used to create sinks.
    stream_handle: OutputStreamHandle,

    /// Current playback sink (if any).
    sink: Option<Sink>,
}

impl AudioPlayback {
    /// Create a new audio playback instance using the default output device.
    pub fn new() -> Result<Self, VoiceError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| VoiceError::OutputStreamError(e.to_string()))?;

        tracing::info!("Audio playback initialized on default output device");

        Ok(Self {
            _stream: stream,
            stream_handle,
            sink: None,
        })
    }

    /// Decode `path` and start playing it, replacing anything already playing.
    pub fn play_file(&mut self, path: &Path) -> Result<(), VoiceError> {
        self.stop();

        let file = File::open(path)?;
        let source = Decoder::new(BufReader::new(file))
            .map_err(|e| VoiceError::DecodeError(e.to_string()))?;

        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| VoiceError::OutputStreamError(e.to_string()))?;
        sink.append(source);
        self.sink = Some(sink);

        tracing::debug!(path = %path.display(), "Audio playback started");
        Ok(())
    }

    pub fn pause(&self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    pub fn resume(&self) {
        if let Some(sink) = &self.sink {
            sink.play();
        }
    }

    /// Stop any active playback immediately and release the decoder.
    pub fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
            tracing::debug!("Audio playback stopped");
        }
    }

    /// Whether queued audio remains. A paused sink still counts as playing.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.sink.as_ref().is_some_and(|sink| !sink.empty())
    }
}
