//! Playback controller: a message-driven state machine over a segment queue.
//!
//! ```text
//!   Idle ──play──▶ Playing ──pause──▶ Paused
//!    ▲               │  ▲               │
//!    │             (end) └────play──────┘
//!    │               ▼
//!    └──stop──── Finished ──play (rewind)──▶ Playing
//! ```
//!
//! The [`PlaybackController`] handle forwards commands over a channel to a
//! single tokio task that owns the queue, the current index, the state and
//! the voice assigner. That task is the only writer, so nothing is locked.
//! The utterance in flight runs as its own task and is steered through a
//! [`TransportHandle`]; the controller task waits on either the next command
//! or that utterance's outcome.

use std::sync::Arc;
use std::time::Duration;

use moltreader_core::{
    Segment, SpeakOutcome, SpeechSynthesizer, SynthesisError, TransportHandle, TransportSignal,
    VoiceAssigner,
};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::VoiceError;
use crate::events::{FINISHED_MESSAGE, PlaybackEvent, PlaybackState, PlaybackStatus, ProgressUpdate};

/// Controller tuning.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// How long an interrupted utterance may take to release its resources
    /// before its task is aborted.
    pub cancel_grace: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            cancel_grace: Duration::from_secs(2),
        }
    }
}

enum Command {
    Load(Vec<Segment>),
    Play,
    Pause,
    Skip,
    Stop,
    ResetVoices,
    Status,
}

struct Request {
    command: Command,
    reply: oneshot::Sender<PlaybackStatus>,
}

/// Handle to a running playback controller task.
///
/// Every method returns the status snapshot taken right after the command
/// was applied. Dropping the handle shuts the task down and interrupts any
/// utterance in flight.
pub struct PlaybackController {
    cmd_tx: mpsc::UnboundedSender<Request>,
    task: JoinHandle<()>,
}

impl PlaybackController {
    /// Spawn a controller task on the current tokio runtime.
    pub fn spawn(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        assigner: VoiceAssigner,
    ) -> (Self, mpsc::UnboundedReceiver<PlaybackEvent>) {
        Self::with_config(synthesizer, assigner, ControllerConfig::default())
    }

    pub fn with_config(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        assigner: VoiceAssigner,
        config: ControllerConfig,
    ) -> (Self, mpsc::UnboundedReceiver<PlaybackEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        tracing::debug!(backend = synthesizer.name(), "Starting playback controller");

        let worker = ControllerTask {
            session: PlaybackSession::new(assigner),
            synthesizer,
            events: event_tx,
            in_flight: None,
            pending_skips: 0,
            pending_advance: false,
            cancel_grace: config.cancel_grace,
        };
        let task = tokio::spawn(worker.run(cmd_rx));

        (Self { cmd_tx, task }, event_rx)
    }

    /// Replace the queue and rewind to the start. Voice assignments are kept.
    pub async fn load(&self, segments: Vec<Segment>) -> Result<PlaybackStatus, VoiceError> {
        self.request(Command::Load(segments)).await
    }

    /// Start, resume, or restart after finishing.
    pub async fn play(&self) -> Result<PlaybackStatus, VoiceError> {
        self.request(Command::Play).await
    }

    pub async fn pause(&self) -> Result<PlaybackStatus, VoiceError> {
        self.request(Command::Pause).await
    }

    /// Abandon the current segment and move on to the next one.
    pub async fn skip(&self) -> Result<PlaybackStatus, VoiceError> {
        self.request(Command::Skip).await
    }

    /// Interrupt playback, rewind to the start and forget voice assignments.
    pub async fn stop(&self) -> Result<PlaybackStatus, VoiceError> {
        self.request(Command::Stop).await
    }

    /// Forget voice assignments without touching playback.
    pub async fn reset_voices(&self) -> Result<PlaybackStatus, VoiceError> {
        self.request(Command::ResetVoices).await
    }

    pub async fn status(&self) -> Result<PlaybackStatus, VoiceError> {
        self.request(Command::Status).await
    }

    /// Current index and the last progress line.
    pub async fn current_item(&self) -> Result<(usize, Option<String>), VoiceError> {
        let status = self.status().await?;
        Ok((status.current_index, status.progress_text))
    }

    /// Stop the controller task and wait for it to release its resources.
    pub async fn shutdown(self) {
        let Self { cmd_tx, task } = self;
        drop(cmd_tx);
        if let Err(e) = task.await {
            tracing::warn!(error = %e, "Playback controller task ended abnormally");
        }
    }

    async fn request(&self, command: Command) -> Result<PlaybackStatus, VoiceError> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(Request { command, reply })
            .map_err(|_| VoiceError::ControllerClosed)?;
        rx.await.map_err(|_| VoiceError::ControllerClosed)
    }
}

// ── Controller task ────────────────────────────────────────────────

/// Everything one playback session owns.
struct PlaybackSession {
    segments: Vec<Segment>,
    current_index: usize,
    state: PlaybackState,
    assigner: VoiceAssigner,
    progress_text: Option<String>,
}

impl PlaybackSession {
    fn new(assigner: VoiceAssigner) -> Self {
        Self {
            segments: Vec::new(),
            current_index: 0,
            state: PlaybackState::Idle,
            assigner,
            progress_text: None,
        }
    }
}

/// The utterance currently being spoken.
struct Utterance {
    task: JoinHandle<SpeakOutcome>,
    transport: TransportHandle,
}

enum Step {
    Request(Option<Request>),
    Outcome(Result<SpeakOutcome, tokio::task::JoinError>),
}

struct ControllerTask {
    session: PlaybackSession,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    events: mpsc::UnboundedSender<PlaybackEvent>,
    in_flight: Option<Utterance>,
    /// Skips issued while an utterance was being interrupted.
    pending_skips: usize,
    /// An utterance completed while paused; advance on resume.
    pending_advance: bool,
    cancel_grace: Duration,
}

impl ControllerTask {
    async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<Request>) {
        loop {
            self.advance();

            let step = match self.in_flight.as_mut() {
                Some(utterance) => tokio::select! {
                    request = cmd_rx.recv() => Step::Request(request),
                    outcome = &mut utterance.task => Step::Outcome(outcome),
                },
                None => Step::Request(cmd_rx.recv().await),
            };

            match step {
                Step::Request(Some(Request { command, reply })) => {
                    let status = self.handle(command).await;
                    let _ = reply.send(status);
                }
                Step::Request(None) => break,
                Step::Outcome(outcome) => {
                    self.in_flight = None;
                    let outcome = outcome.unwrap_or_else(|e| {
                        SpeakOutcome::Failed(SynthesisError::Playback(format!(
                            "utterance task failed: {e}"
                        )))
                    });
                    self.on_outcome(outcome);
                }
            }
        }

        self.interrupt().await;
        tracing::debug!("Playback controller shut down");
    }

    async fn handle(&mut self, command: Command) -> PlaybackStatus {
        match command {
            Command::Load(segments) => self.load(segments).await,
            Command::Play => self.play(),
            Command::Pause => self.pause(),
            Command::Skip => self.skip(),
            Command::Stop => self.stop().await,
            Command::ResetVoices => self.session.assigner.reset(),
            Command::Status => {}
        }
        self.advance();
        self.status()
    }

    async fn load(&mut self, segments: Vec<Segment>) {
        self.interrupt().await;
        tracing::info!(count = segments.len(), "Loaded segments");
        self.session.segments = segments;
        self.session.current_index = 0;
        self.session.progress_text = None;
        self.pending_advance = false;
        self.set_state(PlaybackState::Idle);
    }

    fn play(&mut self) {
        match self.session.state {
            PlaybackState::Playing => {
                tracing::debug!("Already playing");
            }
            PlaybackState::Paused => {
                self.set_state(PlaybackState::Playing);
                if let Some(utterance) = &self.in_flight {
                    utterance.transport.send(TransportSignal::Run);
                }
                if std::mem::take(&mut self.pending_advance) {
                    self.step_forward(1);
                }
            }
            PlaybackState::Idle | PlaybackState::Finished => {
                if self.session.segments.is_empty() {
                    tracing::debug!("Nothing to play");
                    return;
                }
                if self.session.state == PlaybackState::Finished {
                    self.session.current_index = 0;
                }
                self.set_state(PlaybackState::Playing);
            }
        }
    }

    fn pause(&mut self) {
        if self.session.state != PlaybackState::Playing {
            return;
        }
        self.set_state(PlaybackState::Paused);
        if let Some(utterance) = &self.in_flight {
            utterance.transport.send(TransportSignal::Pause);
        }
    }

    fn skip(&mut self) {
        if !matches!(
            self.session.state,
            PlaybackState::Playing | PlaybackState::Paused
        ) {
            return;
        }

        // Clear the pause first so the loop never waits on it after skipping.
        self.set_state(PlaybackState::Playing);
        self.pending_advance = false;

        match &self.in_flight {
            Some(utterance) => {
                self.pending_skips += 1;
                utterance.transport.send(TransportSignal::Cancel);
            }
            None => self.step_forward(1),
        }
    }

    async fn stop(&mut self) {
        self.interrupt().await;
        self.session.current_index = 0;
        self.session.progress_text = None;
        self.session.assigner.reset();
        self.pending_advance = false;
        self.set_state(PlaybackState::Idle);
        tracing::info!("Playback stopped");
    }

    /// Start the next utterance, or finish, if playing and nothing is in flight.
    fn advance(&mut self) {
        if self.session.state != PlaybackState::Playing || self.in_flight.is_some() {
            return;
        }

        let index = self.session.current_index;
        let total = self.session.segments.len();
        let Some(segment) = self.session.segments.get(index).cloned() else {
            self.session.current_index = total;
            self.session.progress_text = Some(FINISHED_MESSAGE.to_string());
            self.set_state(PlaybackState::Finished);
            tracing::info!(total, "Finished reading");
            self.emit(PlaybackEvent::Finished);
            return;
        };

        let voice = self.session.assigner.assign(&segment.speaker);
        let update = ProgressUpdate {
            index,
            total,
            speaker: segment.speaker.clone(),
            voice: voice.clone(),
        };
        tracing::info!(
            index,
            total,
            speaker = %segment.speaker,
            voice = %voice.id,
            "Speaking segment"
        );
        self.session.progress_text = Some(update.to_string());
        self.emit(PlaybackEvent::Progress(update));
        self.emit(PlaybackEvent::Text(segment.text.clone()));

        let (transport, utterance_transport) = TransportHandle::new();
        let synthesizer = Arc::clone(&self.synthesizer);
        let text = segment.utterance();
        let task = tokio::spawn(async move {
            synthesizer
                .speak(&text, &voice.id, utterance_transport)
                .await
        });
        self.in_flight = Some(Utterance { task, transport });
    }

    fn on_outcome(&mut self, outcome: SpeakOutcome) {
        let skips = std::mem::take(&mut self.pending_skips);
        if skips > 0 {
            tracing::debug!(skips, "Utterance skipped");
            self.step_forward(skips);
            return;
        }

        match outcome {
            SpeakOutcome::Completed if self.session.state == PlaybackState::Paused => {
                // Pause wins over natural advancement.
                self.pending_advance = true;
            }
            SpeakOutcome::Completed => self.step_forward(1),
            SpeakOutcome::Interrupted => {
                tracing::debug!(
                    index = self.session.current_index,
                    "Utterance interrupted"
                );
            }
            SpeakOutcome::Failed(e) => {
                tracing::error!(
                    index = self.session.current_index,
                    error = %e,
                    "Utterance failed, stopping playback"
                );
                self.emit(PlaybackEvent::Failed(e.to_string()));
                self.set_state(PlaybackState::Idle);
            }
        }
    }

    /// Cancel the utterance in flight and wait for it to release its resources.
    async fn interrupt(&mut self) {
        self.pending_skips = 0;
        let Some(Utterance {
            mut task,
            transport,
        }) = self.in_flight.take()
        else {
            return;
        };

        transport.send(TransportSignal::Cancel);
        if tokio::time::timeout(self.cancel_grace, &mut task)
            .await
            .is_err()
        {
            tracing::warn!(
                grace_ms = self.cancel_grace.as_millis(),
                "Utterance ignored cancellation, aborting"
            );
            task.abort();
            let _ = task.await;
        }
    }

    fn step_forward(&mut self, by: usize) {
        let total = self.session.segments.len();
        self.session.current_index = self.session.current_index.saturating_add(by).min(total);
    }

    fn status(&self) -> PlaybackStatus {
        PlaybackStatus {
            state: self.session.state,
            current_index: self.session.current_index,
            total: self.session.segments.len(),
            progress_text: self.session.progress_text.clone(),
        }
    }

    /// Transition to a new state and emit a state-change event.
    fn set_state(&mut self, new_state: PlaybackState) {
        if self.session.state != new_state {
            tracing::debug!(from = %self.session.state, to = %new_state, "Playback state changed");
            self.session.state = new_state;
            self.emit(PlaybackEvent::StateChanged(new_state));
        }
    }

    fn emit(&self, event: PlaybackEvent) {
        // Receiver may be gone (UI closed); playback carries on regardless.
        let _ = self.events.send(event);
    }
}
