//! Synthesize to a temp file, then play it while watching the transport.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moltreader_core::{
    MAX_POLL_INTERVAL_MS, SpeakOutcome, SpeechEngine, SpeechSynthesizer, SynthesisError,
    TransportSignal, UtteranceTransport,
};
use tempfile::NamedTempFile;

use crate::error::VoiceError;

/// Local audio sink the buffered backend plays through.
///
/// Implemented by [`AudioThreadHandle`](crate::AudioThreadHandle) for real
/// output devices. `stop` must not return before the file is released.
pub trait AudioOutput: Send + Sync {
    fn play(&self, path: &Path) -> Result<(), VoiceError>;
    fn pause(&self);
    fn resume(&self);
    fn stop(&self);
    /// Whether audio remains queued (paused audio counts).
    fn is_playing(&self) -> bool;
}

/// Stops the output when dropped, so every exit path releases the sink
/// before the temp file is removed.
struct StopOnDrop<'a>(&'a dyn AudioOutput);

impl Drop for StopOnDrop<'_> {
    fn drop(&mut self) {
        self.0.stop();
    }
}

/// Engine bytes → temp file → audio output, polled at a bounded interval.
pub struct BufferedSynthesizer {
    engine: Arc<dyn SpeechEngine>,
    output: Arc<dyn AudioOutput>,
    poll_interval: Duration,
}

impl BufferedSynthesizer {
    /// `poll_interval` is clamped to `1..=MAX_POLL_INTERVAL_MS` milliseconds.
    pub fn new(
        engine: Arc<dyn SpeechEngine>,
        output: Arc<dyn AudioOutput>,
        poll_interval: Duration,
    ) -> Self {
        let poll_interval = poll_interval.clamp(
            Duration::from_millis(1),
            Duration::from_millis(MAX_POLL_INTERVAL_MS),
        );
        Self {
            engine,
            output,
            poll_interval,
        }
    }

    fn write_temp_file(audio: &[u8]) -> Result<NamedTempFile, SynthesisError> {
        let mut file = tempfile::Builder::new()
            .prefix("moltreader-")
            .suffix(".mp3")
            .tempfile()?;
        file.write_all(audio)?;
        file.flush()?;
        Ok(file)
    }
}

#[async_trait]
impl SpeechSynthesizer for BufferedSynthesizer {
    async fn speak(
        &self,
        text: &str,
        voice_id: &str,
        mut transport: UtteranceTransport,
    ) -> SpeakOutcome {
        let audio = {
            let mut watch = transport.clone();
            tokio::select! {
                biased;
                () = watch.cancelled() => return SpeakOutcome::Interrupted,
                result = self.engine.synthesize(text, voice_id) => match result {
                    Ok(audio) => audio,
                    Err(e) => return SpeakOutcome::Failed(e),
                },
            }
        };

        if transport.wait_while_paused().await == TransportSignal::Cancel {
            return SpeakOutcome::Interrupted;
        }

        let file = match Self::write_temp_file(&audio) {
            Ok(file) => file,
            Err(e) => return SpeakOutcome::Failed(e),
        };

        if let Err(e) = self.output.play(file.path()) {
            return SpeakOutcome::Failed(SynthesisError::Playback(e.to_string()));
        }
        // Dropped before `file`.
        let _playing = StopOnDrop(self.output.as_ref());
        tracing::debug!(bytes = audio.len(), voice = voice_id, "Playing synthesized audio");

        let mut paused = false;
        let mut poll = tokio::time::interval(self.poll_interval);
        loop {
            tokio::select! {
                signal = transport.changed() => match signal {
                    TransportSignal::Cancel => return SpeakOutcome::Interrupted,
                    TransportSignal::Pause if !paused => {
                        self.output.pause();
                        paused = true;
                    }
                    TransportSignal::Run if paused => {
                        self.output.resume();
                        paused = false;
                    }
                    _ => {}
                },
                _ = poll.tick() => {
                    if !paused && !self.output.is_playing() {
                        return SpeakOutcome::Completed;
                    }
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "buffered"
    }
}
