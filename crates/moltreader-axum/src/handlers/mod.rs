//! HTTP request handlers for the Axum web server.

pub mod reader;

use axum::http::HeaderMap;
use moltreader_core::SessionKey;

/// Request/response header carrying the session key.
pub const SESSION_HEADER: &str = "x-session-key";

/// Audio response header naming the segment's speaker.
pub const AUTHOR_HEADER: &str = "x-author";

/// Audio response header naming the voice used.
pub const VOICE_HEADER: &str = "x-voice";

/// The client's session key, if it sent a usable one.
pub(crate) fn session_key(headers: &HeaderMap) -> Option<SessionKey> {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(SessionKey::parse)
}
