//! States, events and status snapshots published by the playback controller.

use std::fmt;

use moltreader_core::Voice;
use serde::{Deserialize, Serialize};

/// Progress line emitted when playback runs off the end of the queue.
pub const FINISHED_MESSAGE: &str = "Finished reading";

/// Playback controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// Nothing loaded, loaded but never started, stopped, or failed.
    #[default]
    Idle,

    /// The consumer loop is speaking segments.
    Playing,

    /// Suspended; `current_index` is kept.
    Paused,

    /// The queue was exhausted.
    Finished,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Finished => "finished",
        };
        f.write_str(label)
    }
}

/// One segment about to be spoken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// Zero-based segment index.
    pub index: usize,
    pub total: usize,
    pub speaker: String,
    pub voice: Voice,
}

impl fmt::Display for ProgressUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}/{}] {} (voice: {})",
            self.index + 1,
            self.total,
            self.speaker,
            self.voice.name
        )
    }
}

/// Events emitted by the playback controller to the UI / application layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Controller state changed. Only sent on an actual change.
    StateChanged(PlaybackState),

    /// A segment is about to be spoken.
    Progress(ProgressUpdate),

    /// The text of the segment about to be spoken.
    Text(String),

    /// The queue was played to the end. Never sent after a stop.
    Finished,

    /// An utterance failed; playback went back to idle.
    Failed(String),
}

impl fmt::Display for PlaybackEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StateChanged(state) => write!(f, "State: {state}"),
            Self::Progress(update) => update.fmt(f),
            Self::Text(text) => f.write_str(text),
            Self::Finished => f.write_str(FINISHED_MESSAGE),
            Self::Failed(reason) => write!(f, "Error: {reason}"),
        }
    }
}

/// Snapshot of the controller, returned by every command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackStatus {
    pub state: PlaybackState,
    pub current_index: usize,
    pub total: usize,
    /// Last progress line, if anything has been spoken since the last load/stop.
    pub progress_text: Option<String>,
}
