//! Session storage port for the web variant.
//!
//! One logical browser session maps to one [`StoredSession`]. The store is a
//! plain key-value layer; how long idle sessions survive is decided by an
//! injected [`ExpiryPolicy`], not by the store itself.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Segment, VoiceAssignments};
use crate::error::SessionStoreError;

/// Opaque session identifier handed to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionKey(String);

impl SessionKey {
    /// Issue a fresh random key.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Accept a client-supplied key. Blank strings are not keys.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything the web variant remembers between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub segments: Vec<Segment>,
    pub assignments: VoiceAssignments,
    pub current_index: usize,
}

/// CRUD access to stored sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &SessionKey) -> Result<Option<StoredSession>, SessionStoreError>;

    async fn put(&self, key: &SessionKey, session: StoredSession)
    -> Result<(), SessionStoreError>;

    /// Remove a session. Returns whether anything was removed.
    async fn delete(&self, key: &SessionKey) -> Result<bool, SessionStoreError>;
}

/// Decides when an idle session may be discarded.
pub trait ExpiryPolicy: Send + Sync + fmt::Debug {
    fn is_expired(&self, idle_for: Duration) -> bool;
}

/// Sessions expire after a fixed period without access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleTimeout(pub Duration);

impl ExpiryPolicy for IdleTimeout {
    fn is_expired(&self, idle_for: Duration) -> bool {
        idle_for >= self.0
    }
}

/// Sessions live until explicitly deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NeverExpire;

impl ExpiryPolicy for NeverExpire {
    fn is_expired(&self, _idle_for: Duration) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_are_unique() {
        assert_ne!(SessionKey::generate(), SessionKey::generate());
    }

    #[test]
    fn blank_keys_are_rejected() {
        assert!(SessionKey::parse("   ").is_none());
        assert_eq!(SessionKey::parse(" abc ").unwrap().as_str(), "abc");
    }

    #[test]
    fn idle_timeout_boundary() {
        let policy = IdleTimeout(Duration::from_secs(60));
        assert!(!policy.is_expired(Duration::from_secs(59)));
        assert!(policy.is_expired(Duration::from_secs(60)));
        assert!(!NeverExpire.is_expired(Duration::MAX));
    }

    #[test]
    fn stored_session_uses_camel_case() {
        let json = serde_json::to_value(StoredSession::default()).unwrap();
        assert!(json.get("currentIndex").is_some());
    }
}
