//! Axum server bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the web adapter. All concrete implementations are instantiated here.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use moltreader_core::{
    ExpiryPolicy, IdleTimeout, NeverExpire, PageLoader, ReaderSettings, SessionStore,
    SpeechEngine, VoicePool,
};
use moltreader_fetch::{HttpPageRenderer, JsonSegmentExtractor, RendererConfig};
use moltreader_voice::{HttpEngineConfig, HttpSpeechEngine};

use crate::session_store::InMemorySessionStore;

/// How often idle sessions are swept when an idle timeout is configured.
const DEFAULT_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default)]
pub enum CorsConfig {
    /// Allow all origins (development mode).
    #[default]
    AllowAll,
    /// Allow specific origins (production mode).
    AllowOrigins(Vec<String>),
}

/// Server configuration for the Axum adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port for the HTTP server.
    pub port: u16,
    /// CORS configuration.
    pub cors: CorsConfig,
    /// Interval between idle-session sweeps.
    pub purge_interval: Duration,
}

impl ServerConfig {
    pub fn from_settings(settings: &ReaderSettings) -> Self {
        Self {
            port: settings.effective_server_port(),
            cors: CorsConfig::default(),
            purge_interval: DEFAULT_PURGE_INTERVAL,
        }
    }

    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set CORS to allow specific origins.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.cors = CorsConfig::AllowOrigins(origins);
        self
    }
}

/// Application context for the Axum adapter.
///
/// Holds every collaborator the handlers need, behind its port.
pub struct AxumContext {
    /// URL validation, rendering and extraction.
    pub loader: PageLoader,
    /// Text → MPEG audio.
    pub engine: Arc<dyn SpeechEngine>,
    /// Per-browser reading sessions.
    pub sessions: Arc<dyn SessionStore>,
    /// Voices new speakers are drawn from.
    pub voices: VoicePool,
}

impl AxumContext {
    pub fn new(
        loader: PageLoader,
        engine: Arc<dyn SpeechEngine>,
        sessions: Arc<dyn SessionStore>,
        voices: VoicePool,
    ) -> Self {
        Self {
            loader,
            engine,
            sessions,
            voices,
        }
    }
}

impl std::fmt::Debug for AxumContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AxumContext")
            .field("loader", &self.loader)
            .field("voices", &self.voices.len())
            .finish_non_exhaustive()
    }
}

/// Bootstrap the web adapter from settings.
///
/// Must be called inside a tokio runtime: when an idle timeout is configured
/// a background task purges expired sessions every `purge_interval`.
pub fn bootstrap(settings: &ReaderSettings, purge_interval: Duration) -> Result<AxumContext> {
    // 1. Page loading
    let renderer = HttpPageRenderer::new(&RendererConfig::from_settings(settings))?;
    let loader = PageLoader::new(
        Arc::new(renderer),
        Arc::new(JsonSegmentExtractor::new()),
        settings.effective_allowed_host(),
    );

    // 2. Speech engine
    let engine_config = HttpEngineConfig::from_settings(settings);
    tracing::info!(
        target: "moltreader.tts",
        base_url = %engine_config.base_url,
        model = %engine_config.model,
        "Using HTTP speech engine"
    );
    let engine: Arc<dyn SpeechEngine> = Arc::new(HttpSpeechEngine::new(engine_config)?);

    // 3. Voices
    let voices = settings.voice_pool_or(VoicePool::neural())?;

    // 4. Sessions, with expiry injected
    let policy: Arc<dyn ExpiryPolicy> = match settings.session_idle_timeout() {
        Some(timeout) => Arc::new(IdleTimeout(timeout)),
        None => Arc::new(NeverExpire),
    };
    let store = Arc::new(InMemorySessionStore::new(policy));
    if settings.session_idle_timeout().is_some() {
        spawn_purge_task(Arc::clone(&store), purge_interval);
    }

    Ok(AxumContext::new(loader, engine, store, voices))
}

fn spawn_purge_task(store: Arc<InMemorySessionStore>, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            store.purge_expired().await;
        }
    });
}

/// Start the web server on the configured port.
pub async fn start_server(config: ServerConfig, settings: &ReaderSettings) -> Result<()> {
    use tokio::net::TcpListener;
    use tracing::info;

    let ctx = bootstrap(settings, config.purge_interval)?;
    info!(
        allowed_host = ctx.loader.allowed_host(),
        voices = ctx.voices.len(),
        "Web reader ready"
    );

    let app = crate::routes::create_router(ctx, &config.cors);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("moltreader web server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
