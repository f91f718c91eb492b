//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `reqwest`, `rodio` or `axum` types in any signature
//! - Synthesis backends are selected at construction time behind
//!   [`SpeechSynthesizer`], never by inspecting their concrete type
//! - Session storage is CRUD-only; expiry is a separate injected policy

pub mod page_source;
pub mod session_store;
pub mod speech;

pub use page_source::{PageRenderer, SegmentExtractor};
pub use session_store::{
    ExpiryPolicy, IdleTimeout, NeverExpire, SessionKey, SessionStore, StoredSession,
};
pub use speech::{
    SpeakOutcome, SpeechEngine, SpeechSynthesizer, TransportHandle, TransportSignal,
    UtteranceTransport,
};
