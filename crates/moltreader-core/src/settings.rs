//! Settings domain types and validation.
//!
//! All fields are optional so a settings file only needs to mention what it
//! overrides; the `effective_*` accessors supply the defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{Voice, VoicePool};

/// Only URLs containing this host are accepted for loading.
pub const DEFAULT_ALLOWED_HOST: &str = "moltbook.com";

/// Page navigation timeout.
pub const DEFAULT_PAGE_LOAD_TIMEOUT_SECS: u64 = 30;

/// Wait for the main content to appear after navigation.
pub const DEFAULT_SELECTOR_TIMEOUT_SECS: u64 = 15;

/// Optional wait for secondary content (comments). Timing out is not fatal.
pub const DEFAULT_SECONDARY_WAIT_TIMEOUT_SECS: u64 = 10;

/// Playback completion poll interval of the buffered backend.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Upper bound on the poll interval; stop/skip must react within this.
pub const MAX_POLL_INTERVAL_MS: u64 = 100;

/// OpenAI-compatible speech endpoint base URL.
pub const DEFAULT_TTS_BASE_URL: &str = "http://127.0.0.1:8880";

pub const DEFAULT_TTS_MODEL: &str = "tts-1";

pub const DEFAULT_TTS_TIMEOUT_SECS: u64 = 60;

/// Idle web sessions are discarded after this long.
pub const DEFAULT_SESSION_IDLE_TIMEOUT_SECS: u64 = 3600;

pub const DEFAULT_SERVER_PORT: u16 = 5001;

/// Application settings structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReaderSettings {
    /// Host a page URL must belong to.
    pub allowed_host: Option<String>,

    /// Page load timeout in seconds.
    pub page_load_timeout_secs: Option<u64>,

    /// Main-content wait in seconds (renderers that support it).
    pub selector_timeout_secs: Option<u64>,

    /// Secondary-content wait in seconds (renderers that support it).
    pub secondary_wait_timeout_secs: Option<u64>,

    /// Buffered playback poll interval in milliseconds (1-100).
    pub poll_interval_ms: Option<u64>,

    /// Base URL of the speech endpoint.
    pub tts_base_url: Option<String>,

    /// Model name sent to the speech endpoint.
    pub tts_model: Option<String>,

    /// Bearer token for the speech endpoint.
    pub tts_api_key: Option<String>,

    /// Speech request timeout in seconds.
    pub tts_timeout_secs: Option<u64>,

    /// Custom voice pool; replaces the backend's built-in pool.
    pub voices: Option<Vec<Voice>>,

    /// Web session idle timeout in seconds. `0` keeps sessions forever.
    pub session_idle_timeout_secs: Option<u64>,

    /// Port for the web server.
    pub server_port: Option<u16>,
}

impl ReaderSettings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            allowed_host: Some(DEFAULT_ALLOWED_HOST.to_string()),
            page_load_timeout_secs: Some(DEFAULT_PAGE_LOAD_TIMEOUT_SECS),
            selector_timeout_secs: Some(DEFAULT_SELECTOR_TIMEOUT_SECS),
            secondary_wait_timeout_secs: Some(DEFAULT_SECONDARY_WAIT_TIMEOUT_SECS),
            poll_interval_ms: Some(DEFAULT_POLL_INTERVAL_MS),
            tts_base_url: Some(DEFAULT_TTS_BASE_URL.to_string()),
            tts_model: Some(DEFAULT_TTS_MODEL.to_string()),
            tts_api_key: None,
            tts_timeout_secs: Some(DEFAULT_TTS_TIMEOUT_SECS),
            voices: None,
            session_idle_timeout_secs: Some(DEFAULT_SESSION_IDLE_TIMEOUT_SECS),
            server_port: Some(DEFAULT_SERVER_PORT),
        }
    }

    /// Default settings file location (`<config dir>/moltreader/settings.json`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("moltreader").join("settings.json"))
    }

    /// Read settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let raw = std::fs::read_to_string(path).map_err(|e| SettingsError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let settings: Self = serde_json::from_str(&raw).map_err(|e| SettingsError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        validate_settings(&settings)?;
        tracing::debug!(path = %path.display(), "Loaded settings file");
        Ok(settings)
    }

    /// Read the file at `path` if given, else the default location if it
    /// exists, else fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, SettingsError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::with_defaults()),
        }
    }

    pub fn effective_allowed_host(&self) -> &str {
        self.allowed_host.as_deref().unwrap_or(DEFAULT_ALLOWED_HOST)
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(
            self.page_load_timeout_secs
                .unwrap_or(DEFAULT_PAGE_LOAD_TIMEOUT_SECS),
        )
    }

    pub fn selector_timeout(&self) -> Duration {
        Duration::from_secs(
            self.selector_timeout_secs
                .unwrap_or(DEFAULT_SELECTOR_TIMEOUT_SECS),
        )
    }

    pub fn secondary_wait_timeout(&self) -> Duration {
        Duration::from_secs(
            self.secondary_wait_timeout_secs
                .unwrap_or(DEFAULT_SECONDARY_WAIT_TIMEOUT_SECS),
        )
    }

    /// Poll interval, clamped to `1..=MAX_POLL_INTERVAL_MS`.
    pub fn poll_interval(&self) -> Duration {
        let ms = self
            .poll_interval_ms
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS)
            .clamp(1, MAX_POLL_INTERVAL_MS);
        Duration::from_millis(ms)
    }

    pub fn effective_tts_base_url(&self) -> &str {
        self.tts_base_url.as_deref().unwrap_or(DEFAULT_TTS_BASE_URL)
    }

    pub fn effective_tts_model(&self) -> &str {
        self.tts_model.as_deref().unwrap_or(DEFAULT_TTS_MODEL)
    }

    pub fn tts_timeout(&self) -> Duration {
        Duration::from_secs(self.tts_timeout_secs.unwrap_or(DEFAULT_TTS_TIMEOUT_SECS))
    }

    /// Idle timeout for web sessions; `None` means sessions never expire.
    pub fn session_idle_timeout(&self) -> Option<Duration> {
        match self
            .session_idle_timeout_secs
            .unwrap_or(DEFAULT_SESSION_IDLE_TIMEOUT_SECS)
        {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn effective_server_port(&self) -> u16 {
        self.server_port.unwrap_or(DEFAULT_SERVER_PORT)
    }

    /// The configured voice pool, or `fallback` when none is configured.
    pub fn voice_pool_or(&self, fallback: VoicePool) -> Result<VoicePool, SettingsError> {
        match &self.voices {
            Some(voices) => {
                VoicePool::new(voices.clone()).map_err(|_| SettingsError::EmptyVoicePool)
            }
            None => Ok(fallback),
        }
    }

    /// Merge another settings into this one, only updating fields that are Some.
    pub fn merge(&mut self, other: &SettingsUpdate) {
        if let Some(ref host) = other.allowed_host {
            self.allowed_host.clone_from(host);
        }
        if let Some(timeout) = other.page_load_timeout_secs {
            self.page_load_timeout_secs = timeout;
        }
        if let Some(interval) = other.poll_interval_ms {
            self.poll_interval_ms = interval;
        }
        if let Some(ref url) = other.tts_base_url {
            self.tts_base_url.clone_from(url);
        }
        if let Some(ref model) = other.tts_model {
            self.tts_model.clone_from(model);
        }
        if let Some(ref key) = other.tts_api_key {
            self.tts_api_key.clone_from(key);
        }
        if let Some(port) = other.server_port {
            self.server_port = port;
        }
    }
}

/// Partial settings update.
///
/// Each field is `Option<Option<T>>`:
/// - `None` = don't change this field
/// - `Some(None)` = set field to None/null
/// - `Some(Some(value))` = set field to value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub allowed_host: Option<Option<String>>,
    pub page_load_timeout_secs: Option<Option<u64>>,
    pub poll_interval_ms: Option<Option<u64>>,
    pub tts_base_url: Option<Option<String>>,
    pub tts_model: Option<Option<String>>,
    pub tts_api_key: Option<Option<String>>,
    pub server_port: Option<Option<u16>>,
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettingsError {
    #[error("Allowed host cannot be empty")]
    EmptyAllowedHost,

    #[error("Poll interval must be between 1 and {MAX_POLL_INTERVAL_MS} ms, got {0}")]
    InvalidPollInterval(u64),

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },

    #[error("Voice pool cannot be empty")]
    EmptyVoicePool,

    #[error("TTS base URL cannot be empty")]
    EmptyTtsBaseUrl,

    #[error("Failed to read settings from {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Failed to parse settings in {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Validate settings values.
pub fn validate_settings(settings: &ReaderSettings) -> Result<(), SettingsError> {
    if settings
        .allowed_host
        .as_ref()
        .is_some_and(|host| host.trim().is_empty())
    {
        return Err(SettingsError::EmptyAllowedHost);
    }

    if let Some(interval) = settings.poll_interval_ms {
        if !(1..=MAX_POLL_INTERVAL_MS).contains(&interval) {
            return Err(SettingsError::InvalidPollInterval(interval));
        }
    }

    for (field, value) in [
        ("page_load_timeout_secs", settings.page_load_timeout_secs),
        ("selector_timeout_secs", settings.selector_timeout_secs),
        ("secondary_wait_timeout_secs", settings.secondary_wait_timeout_secs),
        ("tts_timeout_secs", settings.tts_timeout_secs),
    ] {
        if value == Some(0) {
            return Err(SettingsError::ZeroTimeout { field });
        }
    }

    if settings.voices.as_ref().is_some_and(Vec::is_empty) {
        return Err(SettingsError::EmptyVoicePool);
    }

    if settings
        .tts_base_url
        .as_ref()
        .is_some_and(|url| url.trim().is_empty())
    {
        return Err(SettingsError::EmptyTtsBaseUrl);
    }

    Ok(())
}
