//! Time-bounded snapshot cache
//!
//! Holds the most recent snapshot for `ttl`. A zero TTL disables caching so
//! every read goes to the API server.
//!
//! Every invalidation bumps a generation counter. A fetch result is only
//! stored if the generation is unchanged since the fetch started.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use super::snapshot::Snapshot;

#[derive(Debug)]
struct CachedSnapshot {
    stored_at: Instant,
    snapshot: Arc<Snapshot>,
}

#[derive(Debug, Default)]
struct CacheState {
    generation: u64,
    entry: Option<CachedSnapshot>,
}

#[derive(Debug)]
pub struct SnapshotCache {
    ttl: Duration,
    state: RwLock<CacheState>,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: RwLock::new(CacheState::default()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Cached snapshot if it is still fresh at `now`
    pub async fn get(&self, now: Instant) -> Option<Arc<Snapshot>> {
        if !self.is_enabled() {
            return None;
        }

        let state = self.state.read().await;
        state
            .entry
            .as_ref()
            .filter(|cached| now.saturating_duration_since(cached.stored_at) < self.ttl)
            .map(|cached| Arc::clone(&cached.snapshot))
    }

    /// Generation to hand back to [`SnapshotCache::put`] once a fetch completes
    pub async fn generation(&self) -> u64 {
        self.state.read().await.generation
    }

    /// Store `snapshot` unless the cache was invalidated after `generation`
    /// was read; returns whether it was stored
    pub async fn put(&self, snapshot: Arc<Snapshot>, now: Instant, generation: u64) -> bool {
        if !self.is_enabled() {
            return false;
        }

        let mut state = self.state.write().await;
        if state.generation != generation {
            return false;
        }
        state.entry = Some(CachedSnapshot {
            stored_at: now,
            snapshot,
        });
        true
    }

    pub async fn invalidate(&self) {
        let mut state = self.state.write().await;
        state.generation = state.generation.wrapping_add(1);
        state.entry = None;
    }
}
