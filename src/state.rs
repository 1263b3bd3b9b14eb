//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the backend client and the per-(post, user) locks that keep two
//! like toggles from the same user on the same post from interleaving inside
//! this process. Cross-process uniqueness is left to the backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

use crate::backend::{Backend, RowId};
use crate::config::AppConfig;

// =============================================================================
// LIKE LOCKS
// =============================================================================

type LikeKey = (RowId, Uuid);

/// Keyed async mutexes, one per `(post, user)` pair with a toggle in flight.
/// Entries are removed once nobody holds or waits on them, on release or at
/// the next acquire.
#[derive(Clone, Default)]
pub struct LikeLocks {
    inner: Arc<Mutex<HashMap<LikeKey, Arc<tokio::sync::Mutex<()>>>>>,
}

/// Held for the duration of one like toggle.
pub struct LikeGuard {
    key: LikeKey,
    guard: Option<OwnedMutexGuard<()>>,
    locks: LikeLocks,
}

impl LikeLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to the `(post_id, user_id)` pair.
    pub async fn acquire(&self, post_id: &RowId, user_id: Uuid) -> LikeGuard {
        let key = (post_id.clone(), user_id);
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            // A waiter dropped after the last release leaves an idle entry behind.
            map.retain(|_, lock| Arc::strong_count(lock) > 1);
            map.entry(key.clone()).or_default().clone()
        };
        let guard = lock.lock_owned().await;
        LikeGuard { key, guard: Some(guard), locks: self.clone() }
    }

    /// Number of pairs currently tracked.
    #[cfg(test)]
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Drop for LikeGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut map = self
            .locks
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Only the map's own handle left: no holder, no waiter.
        if map
            .get(&self.key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            map.remove(&self.key);
        }
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn Backend>,
    /// Mark session cookies `Secure`.
    pub cookie_secure: bool,
    /// Server-side toggle function; `None` runs the lookup/delete-or-insert sequence.
    pub like_toggle_rpc: Option<String>,
    pub like_locks: LikeLocks,
}

impl AppState {
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>, config: &AppConfig) -> Self {
        Self {
            backend,
            cookie_secure: config.cookie_secure,
            like_toggle_rpc: config.like_toggle_rpc.clone(),
            like_locks: LikeLocks::new(),
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
