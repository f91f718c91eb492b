//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Read Moltbook threads aloud, one voice per speaker.
#[derive(Debug, Parser)]
#[command(name = "moltreader")]
#[command(about = "Read Moltbook threads aloud, one voice per speaker")]
#[command(version)]
pub struct Cli {
    /// Settings file (JSON). Defaults to the platform config directory.
    #[arg(long, global = true, env = "MOLTREADER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL of the OpenAI-compatible speech endpoint
    #[arg(long, global = true, env = "MOLTREADER_TTS_URL")]
    pub tts_url: Option<String>,

    /// Speech model name
    #[arg(long, global = true, env = "MOLTREADER_TTS_MODEL")]
    pub tts_model: Option<String>,

    /// API key for the speech endpoint
    #[arg(long, global = true, env = "MOLTREADER_TTS_API_KEY", hide_env_values = true)]
    pub tts_api_key: Option<String>,

    /// Host that page URLs must belong to
    #[arg(long, global = true, env = "MOLTREADER_ALLOWED_HOST")]
    pub allowed_host: Option<String>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
