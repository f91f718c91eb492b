//! Error taxonomy shared by every adapter.
//!
//! Adapters map these to their own surfaces (HTTP status codes, CLI exit
//! codes). Interruption of an utterance is deliberately absent: it is a
//! [`SpeakOutcome`](crate::ports::SpeakOutcome), not an error.

use thiserror::Error;

/// Retrieval of the raw page failed. Surfaced verbatim, never retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The URL was empty or does not belong to the allowed site.
    #[error("{0}")]
    InvalidUrl(String),

    /// The page did not load within its timeout.
    #[error("Page load timed out. Please try again.")]
    Timeout,

    /// Navigation failed (network error, non-success status, ...).
    #[error("Error fetching page: {0}")]
    Navigation(String),
}

/// The page was retrieved but no readable content came out of it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("No posts or comments found on this page")]
    NoContent,

    #[error("Could not read page content: {0}")]
    Malformed(String),
}

/// Loading a page into segments failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

/// A single utterance could not be synthesized or played.
///
/// Fatal to the current playback run: the controller stops rather than
/// leaving a silent gap.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// The TTS engine rejected or failed the request.
    #[error("Speech synthesis failed: {0}")]
    Engine(String),

    /// Audio output could not play the synthesized audio.
    #[error("Audio playback failed: {0}")]
    Playback(String),

    /// The external speech command failed to start or exited unsuccessfully.
    #[error("Speech command failed: {0}")]
    Process(String),

    /// Temp file or other local IO failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Session storage backend failure.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Session serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_messages_are_user_facing() {
        assert_eq!(
            FetchError::Timeout.to_string(),
            "Page load timed out. Please try again."
        );
        assert_eq!(
            FetchError::InvalidUrl("URL must be from moltbook.com".into()).to_string(),
            "URL must be from moltbook.com"
        );
    }

    #[test]
    fn load_error_is_transparent() {
        let err: LoadError = ExtractionError::NoContent.into();
        assert_eq!(err.to_string(), "No posts or comments found on this page");
    }
}
