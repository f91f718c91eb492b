//! CLI bootstrap - the composition root.
//!
//! Settings are resolved here (file, then environment and flags), and the
//! concrete renderer, extractor and speech backends are instantiated here.
//! Handlers receive a [`CliContext`] and never build infrastructure
//! themselves.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use moltreader_core::{
    PageLoader, ReaderSettings, SettingsUpdate, SpeechEngine, SpeechSynthesizer, VoicePool,
    validate_settings,
};
use moltreader_fetch::{HttpPageRenderer, JsonSegmentExtractor, RendererConfig};
use moltreader_voice::{
    AudioThreadHandle, BufferedSynthesizer, CommandSynthesizer, HttpEngineConfig,
    HttpSpeechEngine,
};

use crate::commands::{Backend, SpeechProgram};
use crate::error::CliError;
use crate::parser::Cli;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Explicit settings file; the platform default is used when absent.
    pub settings_path: Option<PathBuf>,
    /// Overrides from flags and environment.
    pub overrides: SettingsUpdate,
}

impl CliConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            settings_path: cli.config.clone(),
            overrides: SettingsUpdate {
                allowed_host: cli.allowed_host.clone().map(Some),
                tts_base_url: cli.tts_url.clone().map(Some),
                tts_model: cli.tts_model.clone().map(Some),
                tts_api_key: cli.tts_api_key.clone().map(Some),
                ..SettingsUpdate::default()
            },
        }
    }
}

/// Fully composed context for CLI commands.
pub struct CliContext {
    pub settings: ReaderSettings,
    pub loader: PageLoader,
}

impl CliContext {
    /// Build the synthesis backend for `backend` together with the voices
    /// its speakers are drawn from.
    ///
    /// The buffered backend opens the default audio output device here.
    pub async fn synthesizer(
        &self,
        backend: Backend,
        program: SpeechProgram,
    ) -> Result<(Arc<dyn SpeechSynthesizer>, VoicePool)> {
        match backend {
            Backend::Buffered => {
                let engine: Arc<dyn SpeechEngine> = Arc::new(
                    HttpSpeechEngine::new(HttpEngineConfig::from_settings(&self.settings))
                        .map_err(|e| CliError::Audio(e.to_string()))?,
                );
                let output =
                    AudioThreadHandle::spawn().map_err(|e| CliError::Audio(e.to_string()))?;
                let synthesizer = BufferedSynthesizer::new(
                    engine,
                    Arc::new(output),
                    self.settings.poll_interval(),
                );
                let pool = self
                    .settings
                    .voice_pool_or(VoicePool::neural())
                    .map_err(CliError::from)?;
                Ok((Arc::new(synthesizer), pool))
            }
            Backend::Command => {
                let synthesizer = CommandSynthesizer::new(program.voice_command());
                let pool = match self.settings.voices {
                    Some(_) => self
                        .settings
                        .voice_pool_or(VoicePool::say_fallback())
                        .map_err(CliError::from)?,
                    None => synthesizer.discover_voices().await,
                };
                Ok((Arc::new(synthesizer), pool))
            }
        }
    }
}

/// Resolve settings for this invocation.
pub fn resolve_settings(config: &CliConfig) -> Result<ReaderSettings, CliError> {
    let mut settings = ReaderSettings::load_or_default(config.settings_path.as_deref())?;
    settings.merge(&config.overrides);
    validate_settings(&settings)?;
    Ok(settings)
}

/// Bootstrap the CLI context.
pub fn bootstrap(config: CliConfig) -> Result<CliContext> {
    let settings = resolve_settings(&config)?;
    tracing::debug!(
        allowed_host = settings.effective_allowed_host(),
        tts_base_url = settings.effective_tts_base_url(),
        "Resolved settings"
    );

    let renderer = HttpPageRenderer::new(&RendererConfig::from_settings(&settings))
        .map_err(|e| CliError::Config(e.to_string()))?;
    let loader = PageLoader::new(
        Arc::new(renderer),
        Arc::new(JsonSegmentExtractor::new()),
        settings.effective_allowed_host(),
    );

    Ok(CliContext { settings, loader })
}
