//! Shared application state injected into every Axum handler.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::time;
use tracing::info;
use uuid::Uuid;

use crate::session::EncryptionSession;
use crate::suite::SuiteSelector;

/// Idle time after which an untouched session is evicted.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

/// One user's demo: a suite selection and an encryption session.
///
/// The two halves share no state.
#[derive(Debug, Default)]
pub struct DemoSession {
    pub suite: SuiteSelector,
    pub crypto: EncryptionSession,
}

/// Errors from the session registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry already holds the configured maximum number of sessions.
    #[error("session limit of {0} reached")]
    Full(usize),
}

#[derive(Debug)]
struct Slot {
    session: Arc<Mutex<DemoSession>>,
    /// Milliseconds since the registry epoch at the last lookup.
    last_seen: AtomicU64,
}

/// Live demo sessions keyed by id.
///
/// The map is behind an `RwLock`; each session has its own `Mutex` so
/// operations on one session run sequentially without blocking the others.
/// Sessions untouched for longer than the idle TTL are evicted, dropping
/// their keys.
#[derive(Clone, Debug)]
pub struct SessionRegistry {
    inner: Arc<RwLock<HashMap<Uuid, Slot>>>,
    max_sessions: usize,
    idle_ttl: Duration,
    epoch: Instant,
}

impl SessionRegistry {
    pub fn new(max_sessions: usize, idle_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            max_sessions,
            idle_ttl,
            epoch: Instant::now(),
        }
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    pub fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn ttl_ms(&self) -> u64 {
        u64::try_from(self.idle_ttl.as_millis()).unwrap_or(u64::MAX)
    }

    /// Register `session` under a fresh id.
    ///
    /// Idle sessions are evicted first when the registry is at capacity.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Full`] if the registry is still at capacity.
    pub async fn insert(&self, session: DemoSession) -> Result<Uuid, RegistryError> {
        let now = self.now_ms();
        let mut map = self.inner.write().await;
        if map.len() >= self.max_sessions {
            self.retain_active(&mut map, now);
        }
        if map.len() >= self.max_sessions {
            return Err(RegistryError::Full(self.max_sessions));
        }
        let id = Uuid::new_v4();
        map.insert(
            id,
            Slot {
                session: Arc::new(Mutex::new(session)),
                last_seen: AtomicU64::new(now),
            },
        );
        Ok(id)
    }

    /// Look up a session and mark it as active.
    pub async fn get(&self, id: &Uuid) -> Option<Arc<Mutex<DemoSession>>> {
        let map = self.inner.read().await;
        let slot = map.get(id)?;
        slot.last_seen.store(self.now_ms(), Ordering::Relaxed);
        Some(Arc::clone(&slot.session))
    }

    /// Drop a session. Returns `false` if it did not exist.
    pub async fn remove(&self, id: &Uuid) -> bool {
        self.inner.write().await.remove(id).is_some()
    }

    /// Remove every session idle for at least the TTL. Returns how many went.
    pub async fn evict_idle(&self) -> usize {
        let now = self.now_ms();
        let mut map = self.inner.write().await;
        self.retain_active(&mut map, now)
    }

    fn retain_active(&self, map: &mut HashMap<Uuid, Slot>, now: u64) -> usize {
        let ttl = self.ttl_ms();
        let before = map.len();
        map.retain(|_, slot| now.saturating_sub(slot.last_seen.load(Ordering::Relaxed)) < ttl);
        let evicted = before - map.len();
        if evicted > 0 {
            info!(evicted, remaining = map.len(), "idle sessions evicted");
        }
        evicted
    }
}

/// Spawn a background task that periodically evicts idle sessions.
///
/// The first sweep fires after one full interval.
pub fn eviction_task(registry: SessionRegistry, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            registry.evict_idle().await;
        }
    })
}

/// Application state shared across all request handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub sessions: SessionRegistry,
    /// Whether new sessions start with the recommended suite selected.
    pub preselect_recommended: bool,
}

impl AppState {
    pub fn new(max_sessions: usize, preselect_recommended: bool) -> Self {
        Self::with_idle_ttl(max_sessions, preselect_recommended, DEFAULT_IDLE_TTL)
    }

    pub fn with_idle_ttl(
        max_sessions: usize,
        preselect_recommended: bool,
        idle_ttl: Duration,
    ) -> Self {
        Self {
            sessions: SessionRegistry::new(max_sessions, idle_ttl),
            preselect_recommended,
        }
    }
}

impl Default for AppState {
    /// Creates a default [`AppState`], suitable for tests.
    fn default() -> Self {
        Self::new(1024, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_get_remove() {
        let reg = SessionRegistry::new(4, DEFAULT_IDLE_TTL);
        let id = reg.insert(DemoSession::default()).await.unwrap();
        assert_eq!(reg.len().await, 1);
        assert!(reg.get(&id).await.is_some());
        assert!(reg.remove(&id).await);
        assert!(!reg.remove(&id).await);
        assert!(reg.get(&id).await.is_none());
    }

    #[tokio::test]
    async fn rejects_beyond_capacity() {
        let reg = SessionRegistry::new(1, DEFAULT_IDLE_TTL);
        reg.insert(DemoSession::default()).await.unwrap();
        assert!(matches!(
            reg.insert(DemoSession::default()).await,
            Err(RegistryError::Full(1))
        ));
    }

    #[tokio::test]
    async fn idle_sessions_are_evicted() {
        let reg = SessionRegistry::new(4, Duration::from_millis(100));
        let idle = reg.insert(DemoSession::default()).await.unwrap();
        let active = reg.insert(DemoSession::default()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(reg.get(&active).await.is_some());
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(reg.evict_idle().await, 1);
        assert!(reg.get(&idle).await.is_none());
        assert!(reg.get(&active).await.is_some());
    }

    #[tokio::test]
    async fn full_registry_reclaims_idle_capacity() {
        let reg = SessionRegistry::new(1, Duration::from_millis(50));
        let abandoned = reg.insert(DemoSession::default()).await.unwrap();
        assert!(reg.insert(DemoSession::default()).await.is_err());

        tokio::time::sleep(Duration::from_millis(80)).await;
        let fresh = reg.insert(DemoSession::default()).await.unwrap();
        assert!(reg.get(&abandoned).await.is_none());
        assert!(reg.get(&fresh).await.is_some());
        assert_eq!(reg.len().await, 1);
    }

    #[tokio::test]
    async fn eviction_task_sweeps_in_background() {
        let reg = SessionRegistry::new(4, Duration::from_millis(20));
        reg.insert(DemoSession::default()).await.unwrap();
        let task = eviction_task(reg.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(reg.len().await, 0);
        task.abort();
    }

    #[tokio::test]
    async fn sessions_are_independent() {
        let reg = SessionRegistry::new(4, DEFAULT_IDLE_TTL);
        let a = reg.insert(DemoSession::default()).await.unwrap();
        let b = reg.insert(DemoSession::default()).await.unwrap();
        {
            let sa = reg.get(&a).await.unwrap();
            let mut sa = sa.lock().await;
            sa.crypto.generate_key().unwrap();
            sa.suite = SuiteSelector::recommended();
        }
        let sb = reg.get(&b).await.unwrap();
        let sb = sb.lock().await;
        assert!(sb.crypto.key().is_none());
        assert!(sb.suite.state().is_empty());
    }
}
