//! Session registry for multi-user surfaces.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use uuid::Uuid;

use crate::error::StudyError;
use crate::session::SessionState;

pub type SessionId = Uuid;
pub type SharedSession = Arc<RwLock<SessionState>>;

struct Entry {
    state: SharedSession,
    last_seen: Instant,
}

/// Independent [`SessionState`]s keyed by random id, with an idle TTL and a
/// cap on live sessions.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionId, Entry>>,
    max_sessions: usize,
    ttl: Duration,
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("max_sessions", &self.max_sessions)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionRegistry {
    #[must_use]
    pub fn new(max_sessions: usize, ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_sessions,
            ttl,
        }
    }

    /// Open a new empty session.
    ///
    /// # Errors
    ///
    /// Returns [`StudyError::TooManySessions`] if the cap is still reached
    /// after expired sessions are evicted.
    pub async fn create(&self) -> Result<SessionId, StudyError> {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        self.evict_locked(&mut sessions, now);
        if sessions.len() >= self.max_sessions {
            tracing::warn!(limit = self.max_sessions, "session limit reached");
            return Err(StudyError::TooManySessions(self.max_sessions));
        }

        let id = Uuid::new_v4();
        sessions.insert(
            id,
            Entry {
                state: Arc::new(RwLock::new(SessionState::new())),
                last_seen: now,
            },
        );
        tracing::debug!(session = %id, live = sessions.len(), "session created");
        Ok(id)
    }

    /// Look up a session and mark it as used.
    ///
    /// # Errors
    ///
    /// Returns [`StudyError::SessionNotFound`] for unknown or expired ids.
    pub async fn get(&self, id: SessionId) -> Result<SharedSession, StudyError> {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        match sessions.get_mut(&id) {
            Some(entry) if now.duration_since(entry.last_seen) < self.ttl => {
                entry.last_seen = now;
                Ok(Arc::clone(&entry.state))
            }
            Some(_) => {
                sessions.remove(&id);
                tracing::debug!(session = %id, "session expired");
                Err(StudyError::SessionNotFound(id))
            }
            None => Err(StudyError::SessionNotFound(id)),
        }
    }

    /// Returns `true` if the session existed.
    pub async fn remove(&self, id: SessionId) -> bool {
        self.sessions.lock().await.remove(&id).is_some()
    }

    /// Drop every session idle for longer than the TTL. Returns how many
    /// were removed.
    pub async fn evict_expired(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        self.evict_locked(&mut sessions, Instant::now())
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    fn evict_locked(&self, sessions: &mut HashMap<SessionId, Entry>, now: Instant) -> usize {
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < self.ttl);
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, "evicted idle sessions");
        }
        evicted
    }
}
