//! Dedicated audio output thread. Isolates `!Send` audio resources from the async runtime.
//!
//! `rodio::OutputStream` is `!Send` on some platforms. Rather than using
//! `unsafe impl Send/Sync`, we confine it to a single OS thread and
//! communicate via channels.
//!
//! The public [`AudioThreadHandle`] is the `Send + Sync` proxy the buffered
//! synthesizer holds. It routes every call through an [`AudioCommand`] sent
//! to the actor thread.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use crate::backend::AudioOutput;
use crate::error::VoiceError;
use crate::playback::AudioPlayback;

// ── Commands ───────────────────────────────────────────────────────

/// A command sent to the audio thread.
enum AudioCommand {
    /// Decode a file and start playing it.
    PlayFile {
        path: PathBuf,
        reply: mpsc::Sender<Result<(), VoiceError>>,
    },

    /// Pause the current sink (fire-and-forget).
    Pause,

    /// Resume the current sink (fire-and-forget).
    Resume,

    /// Stop playback and drop the sink. Replies once the decoder is released.
    Stop { reply: mpsc::Sender<()> },

    /// Query whether audio is still queued.
    IsPlaying { reply: mpsc::Sender<bool> },

    /// Shut down the audio thread, releasing all resources.
    Shutdown,
}

// ── Handle (Send + Sync proxy) ─────────────────────────────────────

/// `Send + Sync` handle to the dedicated audio output thread.
///
/// All methods take `&self`. Request–reply methods block the caller until
/// the audio thread responds, which is a local channel round trip plus the
/// audio operation itself.
pub struct AudioThreadHandle {
    cmd_tx: mpsc::Sender<AudioCommand>,
    thread: Option<thread::JoinHandle<()>>,
}

impl AudioThreadHandle {
    /// Spawn the audio thread, open the default output device, and return
    /// the handle.
    ///
    /// Errors from [`AudioPlayback::new`] are propagated back to the caller
    /// via a one-shot init channel.
    pub fn spawn() -> Result<Self, VoiceError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<AudioCommand>();
        let (init_tx, init_rx) = mpsc::channel::<Result<(), VoiceError>>();

        let thread = thread::Builder::new()
            .name("moltreader-audio".into())
            .spawn(move || {
                Self::run(&cmd_rx, &init_tx);
            })
            .map_err(|e| {
                VoiceError::OutputStreamError(format!("failed to spawn audio thread: {e}"))
            })?;

        // Wait for the audio thread to finish initialisation.
        init_rx.recv().map_err(|_| VoiceError::AudioThreadDied)??;

        Ok(Self {
            cmd_tx,
            thread: Some(thread),
        })
    }

    /// Send a command that expects a `Result<T, VoiceError>` reply.
    fn send_and_recv<T>(
        &self,
        build: impl FnOnce(mpsc::Sender<Result<T, VoiceError>>) -> AudioCommand,
    ) -> Result<T, VoiceError> {
        let (tx, rx) = mpsc::channel();
        self.cmd_tx
            .send(build(tx))
            .map_err(|_| VoiceError::AudioThreadDied)?;
        rx.recv().map_err(|_| VoiceError::AudioThreadDied)?
    }

    /// Like `send_and_recv` but for replies without a `Result` wrapper.
    /// Returns `None` if the thread is dead.
    fn query<T>(&self, build: impl FnOnce(mpsc::Sender<T>) -> AudioCommand) -> Option<T> {
        let (tx, rx) = mpsc::channel();
        self.cmd_tx.send(build(tx)).ok()?;
        rx.recv().ok()
    }

    // ── Audio thread event loop ────────────────────────────────────

    /// The body of the dedicated audio thread. Owns `AudioPlayback` for its
    /// entire lifetime.
    fn run(cmd_rx: &mpsc::Receiver<AudioCommand>, init_tx: &mpsc::Sender<Result<(), VoiceError>>) {
        let mut playback = match AudioPlayback::new() {
            Ok(p) => p,
            Err(e) => {
                let _ = init_tx.send(Err(e));
                return;
            }
        };

        if init_tx.send(Ok(())).is_err() {
            // Caller dropped.
            return;
        }

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                AudioCommand::PlayFile { path, reply } => {
                    let _ = reply.send(playback.play_file(&path));
                }
                AudioCommand::Pause => playback.pause(),
                AudioCommand::Resume => playback.resume(),
                AudioCommand::Stop { reply } => {
                    playback.stop();
                    let _ = reply.send(());
                }
                AudioCommand::IsPlaying { reply } => {
                    let _ = reply.send(playback.is_playing());
                }
                AudioCommand::Shutdown => break,
            }
        }

        // `playback` is dropped here, on the audio thread.
        tracing::debug!("Audio thread shutting down");
    }
}

impl AudioOutput for AudioThreadHandle {
    fn play(&self, path: &Path) -> Result<(), VoiceError> {
        self.send_and_recv(|reply| AudioCommand::PlayFile {
            path: path.to_path_buf(),
            reply,
        })
    }

    fn pause(&self) {
        let _ = self.cmd_tx.send(AudioCommand::Pause);
    }

    fn resume(&self) {
        let _ = self.cmd_tx.send(AudioCommand::Resume);
    }

    fn stop(&self) {
        // Wait so the caller may delete the file right after.
        let _ = self.query(|reply| AudioCommand::Stop { reply });
    }

    fn is_playing(&self) -> bool {
        self.query(|reply| AudioCommand::IsPlaying { reply })
            .unwrap_or(false)
    }
}

impl Drop for AudioThreadHandle {
    fn drop(&mut self) {
        // Best-effort shutdown; the thread may already be dead.
        let _ = self.cmd_tx.send(AudioCommand::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}
