//! In-memory [`SessionStore`] with pluggable expiry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use moltreader_core::{ExpiryPolicy, SessionKey, SessionStore, SessionStoreError, StoredSession};
use tokio::sync::RwLock;

#[derive(Debug)]
struct Entry {
    session: StoredSession,
    last_access: Instant,
}

/// Process-local session map.
///
/// Expired entries are dropped lazily on access and in bulk by
/// [`purge_expired`](Self::purge_expired).
#[derive(Debug)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionKey, Entry>>,
    policy: Arc<dyn ExpiryPolicy>,
}

impl InMemorySessionStore {
    pub fn new(policy: Arc<dyn ExpiryPolicy>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            policy,
        }
    }

    /// Drop every expired session. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !self.policy.is_expired(entry.last_access.elapsed()));
        let removed = before - sessions.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = sessions.len(), "Purged idle sessions");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, key: &SessionKey) -> Result<Option<StoredSession>, SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        let expired = match sessions.get_mut(key) {
            None => return Ok(None),
            Some(entry) if self.policy.is_expired(entry.last_access.elapsed()) => true,
            Some(entry) => {
                entry.last_access = Instant::now();
                return Ok(Some(entry.session.clone()));
            }
        };
        if expired {
            sessions.remove(key);
            tracing::debug!(session = %key, "Session expired");
        }
        Ok(None)
    }

    async fn put(
        &self,
        key: &SessionKey,
        session: StoredSession,
    ) -> Result<(), SessionStoreError> {
        self.sessions.write().await.insert(
            key.clone(),
            Entry {
                session,
                last_access: Instant::now(),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &SessionKey) -> Result<bool, SessionStoreError> {
        Ok(self.sessions.write().await.remove(key).is_some())
    }
}
