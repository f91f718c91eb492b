//! Speech synthesis ports.
//!
//! Two layers:
//!
//! - [`SpeechEngine`] turns text into encoded audio bytes (a cloud TTS
//!   service, for example). The web variant serves these bytes directly.
//! - [`SpeechSynthesizer`] speaks one utterance end to end and can be
//!   paused or interrupted while doing so. The playback controller only
//!   talks to this trait.
//!
//! The controller steers an in-flight utterance through a watch channel:
//! it holds a [`TransportHandle`] and hands the matching
//! [`UtteranceTransport`] to `speak`.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::SynthesisError;

/// What the controller wants the current utterance to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportSignal {
    /// Keep (or resume) speaking.
    Run,
    /// Suspend at the next poll point.
    Pause,
    /// Abandon the utterance and release its resources.
    Cancel,
}

/// How a single utterance ended.
#[derive(Debug)]
pub enum SpeakOutcome {
    /// Played to the end.
    Completed,
    /// Ended early because of a pause, skip or stop. Not an error.
    Interrupted,
    /// Synthesis or playback failed.
    Failed(SynthesisError),
}

impl SpeakOutcome {
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    pub const fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

/// Controller side of an utterance's transport channel.
#[derive(Debug)]
pub struct TransportHandle {
    tx: watch::Sender<TransportSignal>,
}

impl TransportHandle {
    /// Create a linked handle/transport pair, starting in [`TransportSignal::Run`].
    pub fn new() -> (Self, UtteranceTransport) {
        let (tx, rx) = watch::channel(TransportSignal::Run);
        (Self { tx }, UtteranceTransport { rx })
    }

    /// Publish a new signal. Works even after the utterance has finished.
    pub fn send(&self, signal: TransportSignal) {
        self.tx.send_replace(signal);
    }

    pub fn current(&self) -> TransportSignal {
        *self.tx.borrow()
    }
}

/// Synthesizer side of an utterance's transport channel.
///
/// If the controller goes away the transport reads as
/// [`TransportSignal::Cancel`].
#[derive(Debug, Clone)]
pub struct UtteranceTransport {
    rx: watch::Receiver<TransportSignal>,
}

impl UtteranceTransport {
    /// The latest signal, without waiting.
    pub fn current(&self) -> TransportSignal {
        if self.rx.has_changed().is_err() {
            return TransportSignal::Cancel;
        }
        *self.rx.borrow()
    }

    /// Wait for the next signal change and return the new value.
    pub async fn changed(&mut self) -> TransportSignal {
        match self.rx.changed().await {
            Ok(()) => *self.rx.borrow_and_update(),
            Err(_) => TransportSignal::Cancel,
        }
    }

    /// Block while paused. Returns `Run` or `Cancel`.
    pub async fn wait_while_paused(&mut self) -> TransportSignal {
        loop {
            match self.current() {
                TransportSignal::Pause => {
                    self.changed().await;
                }
                other => return other,
            }
        }
    }

    /// Resolve once the utterance has been cancelled.
    pub async fn cancelled(&mut self) {
        while self.current() != TransportSignal::Cancel {
            self.changed().await;
        }
    }
}

/// Text → encoded audio (MPEG) collaborator.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>, SynthesisError>;

    /// MIME type of the bytes returned by [`synthesize`](Self::synthesize).
    fn mime_type(&self) -> &'static str {
        "audio/mpeg"
    }
}

/// Speaks one utterance with a given voice, honouring transport signals.
///
/// Implementations must release every resource they acquired (temp files,
/// child processes, output sinks) before returning, on every outcome, and
/// must also do so if the returned future is dropped.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn speak(
        &self,
        text: &str,
        voice_id: &str,
        transport: UtteranceTransport,
    ) -> SpeakOutcome;

    /// Short backend label for logs.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn transport_starts_running() {
        let (handle, transport) = TransportHandle::new();
        assert_eq!(handle.current(), TransportSignal::Run);
        assert_eq!(transport.current(), TransportSignal::Run);
    }

    #[tokio::test]
    async fn wait_while_paused_returns_on_resume() {
        let (handle, mut transport) = TransportHandle::new();
        handle.send(TransportSignal::Pause);

        let waiter = tokio::spawn(async move { transport.wait_while_paused().await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        handle.send(TransportSignal::Run);
        assert_eq!(waiter.await.unwrap(), TransportSignal::Run);
    }

    #[tokio::test]
    async fn dropped_handle_reads_as_cancel() {
        let (handle, mut transport) = TransportHandle::new();
        drop(handle);
        assert_eq!(transport.current(), TransportSignal::Cancel);
        assert_eq!(transport.changed().await, TransportSignal::Cancel);
        transport.cancelled().await;
    }
}
