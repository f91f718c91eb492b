//! Subcommands and their option types.

use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};
use moltreader_voice::VoiceCommand;

/// How utterances are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Backend {
    /// Synthesize through the speech endpoint, then play the audio locally
    #[default]
    Buffered,
    /// Run a local speech command per utterance
    Command,
}

/// Local speech program for the command backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SpeechProgram {
    /// macOS `say`
    #[default]
    Say,
    /// `espeak-ng`
    Espeak,
}

impl SpeechProgram {
    pub fn voice_command(self) -> VoiceCommand {
        match self {
            Self::Say => VoiceCommand::say(),
            Self::Espeak => VoiceCommand::espeak(),
        }
    }
}

/// Available commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Read a thread aloud; type play/pause/skip/stop/status/quit on stdin
    Read {
        /// Thread URL to load
        url: Option<String>,
        /// Read segments from a JSON file instead of fetching a URL
        #[arg(long, conflicts_with = "url")]
        segments: Option<PathBuf>,
        /// Synthesis backend
        #[arg(long, value_enum, default_value_t)]
        backend: Backend,
        /// Speech program for the command backend
        #[arg(long = "voice-command", value_enum, default_value_t)]
        speech_program: SpeechProgram,
        /// Load without starting playback
        #[arg(long)]
        no_autoplay: bool,
    },

    /// Start the web reader
    Serve {
        /// Port to listen on (overrides settings)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List the voices new speakers are drawn from
    Voices {
        /// Which backend's voices to list
        #[arg(long, value_enum, default_value_t)]
        backend: Backend,
        /// Speech program for the command backend
        #[arg(long = "voice-command", value_enum, default_value_t)]
        speech_program: SpeechProgram,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}
