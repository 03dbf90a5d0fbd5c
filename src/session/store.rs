//! Session store — in-memory keyed store with TTL eviction.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::state::Session;

/// In-memory session store keyed by session id.
///
/// Each turn mutates its session inside a single write critical section
/// (`with_session`), which serializes concurrent turns on the same id.
/// Idle sessions are evicted once they exceed the configured TTL.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
    idle_ttl: Duration,
}

impl SessionStore {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_ttl,
        }
    }

    /// Run `f` against the session for `id`, creating it first if the id
    /// is absent or unknown. Returns the session id (freshly generated
    /// when none was supplied) alongside `f`'s result.
    pub async fn with_session<F, T>(&self, id: Option<Uuid>, f: F) -> (Uuid, T)
    where
        F: FnOnce(&mut Session) -> T,
    {
        let mut sessions = self.sessions.write().await;
        let id = id.unwrap_or_else(Uuid::new_v4);
        let session = sessions.entry(id).or_insert_with(|| {
            debug!(session_id = %id, "New session created");
            Session::new(id)
        });
        session.last_active_at = Utc::now();
        let out = f(session);
        (id, out)
    }

    /// Get a snapshot of a session, if it exists.
    pub async fn get(&self, id: Uuid) -> Option<Session> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Evict sessions idle longer than the TTL. Returns the eviction count.
    pub async fn evict_expired(&self) -> usize {
        let ttl_secs = self.idle_ttl.as_secs() as i64;
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| (now - s.last_active_at).num_seconds() < ttl_secs);
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(evicted, remaining = sessions.len(), "Expired sessions evicted");
        }
        evicted
    }
}

/// Spawn the periodic eviction sweep.
pub fn spawn_expiry_task(
    store: Arc<SessionStore>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(interval);
        loop {
            interval.tick().await;
            store.evict_expired().await;
        }
    })
}
