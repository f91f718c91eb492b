//! Core domain types and port definitions for moltreader.
//!
//! This crate owns everything that is independent of a particular speech
//! engine, HTTP client or web framework: segments and voices, the voice
//! assigner, the port traits adapters implement, the page loading service,
//! settings, and the error taxonomy shared by every adapter.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{Segment, Voice, VoiceAssigner, VoiceAssignments, VoicePool, VoicePoolError};
pub use error::{ExtractionError, FetchError, LoadError, SessionStoreError, SynthesisError};
pub use ports::{
    ExpiryPolicy, IdleTimeout, NeverExpire, PageRenderer, SegmentExtractor, SessionKey,
    SessionStore, SpeakOutcome, SpeechEngine, SpeechSynthesizer, StoredSession, TransportHandle,
    TransportSignal, UtteranceTransport,
};
pub use services::PageLoader;
pub use settings::{
    DEFAULT_ALLOWED_HOST, DEFAULT_POLL_INTERVAL_MS, DEFAULT_SERVER_PORT, MAX_POLL_INTERVAL_MS,
    ReaderSettings, SettingsError, SettingsUpdate, validate_settings,
};
