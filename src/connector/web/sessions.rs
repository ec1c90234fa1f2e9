//! Browser session registry.
//!
//! Maps a session cookie to the conversation it owns. A session is opened on
//! first visit, closed on reset and evicted once idle for longer than the
//! configured TTL; its transcript goes with it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::{debug, info};

use crate::connector::adapter::InMemorySessionStore;
use crate::domain::ChatSession;

/// One browser conversation.
pub struct WebSession {
    meta: ChatSession,
    store: Arc<InMemorySessionStore>,
    turn_lock: Mutex<()>,
    opened: Instant,
    /// Milliseconds after `opened` of the last request or finished turn.
    last_active_ms: AtomicU64,
}

impl WebSession {
    fn new() -> Self {
        Self {
            meta: ChatSession::new(),
            store: Arc::new(InMemorySessionStore::new()),
            turn_lock: Mutex::new(()),
            opened: Instant::now(),
            last_active_ms: AtomicU64::new(0),
        }
    }

    pub fn id(&self) -> &str {
        self.meta.id()
    }

    pub fn created_at(&self) -> i64 {
        self.meta.created_at()
    }

    pub fn store(&self) -> Arc<InMemorySessionStore> {
        self.store.clone()
    }

    /// Held for the whole of a turn so two submissions from the same session
    /// never interleave their appends. Releasing it counts as activity.
    pub async fn begin_turn(&self) -> TurnGuard<'_> {
        TurnGuard {
            session: self,
            _lock: self.turn_lock.lock().await,
        }
    }

    fn touch(&self) {
        let now = self.opened.elapsed().as_millis() as u64;
        self.last_active_ms.store(now, Ordering::Relaxed);
    }

    fn idle_for(&self) -> Duration {
        let last = Duration::from_millis(self.last_active_ms.load(Ordering::Relaxed));
        self.opened.elapsed().saturating_sub(last)
    }

    fn in_turn(&self) -> bool {
        self.turn_lock.try_lock().is_err()
    }
}

/// A turn in progress; see [`WebSession::begin_turn`].
pub struct TurnGuard<'a> {
    session: &'a WebSession,
    _lock: MutexGuard<'a, ()>,
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        self.session.touch();
    }
}

#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, Arc<WebSession>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Return the session named by `id`, or open a fresh one when `id` is
    /// absent or unknown. The flag is `true` when a session was created.
    pub async fn get_or_open(&self, id: Option<&str>) -> (Arc<WebSession>, bool) {
        let mut sessions = self.sessions.write().await;

        if let Some(session) = id.and_then(|id| sessions.get(id)) {
            session.touch();
            return (session.clone(), false);
        }

        let session = Arc::new(WebSession::new());
        info!("Opened session {}", session.id());
        sessions.insert(session.id().to_string(), session.clone());
        (session, true)
    }

    /// Tear a session down. Returns `false` when it did not exist.
    pub async fn close(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            info!("Closed session {}", id);
        }
        removed
    }

    /// Drop every session idle for longer than `ttl`; returns how many went.
    /// A session with a turn in progress is never idle.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.in_turn() || session.idle_for() <= ttl);
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!("Evicted {} idle sessions", evicted);
        }
        evicted
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
