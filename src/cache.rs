//! In-memory cache with a fixed validity window and tag invalidation.
//!
//! Entries expire `window` after they were stored, or earlier when one of
//! their tags is invalidated. Concurrent misses for the same key are
//! collapsed: callers queue on a per-key lock and the first one to finish
//! the fetch fills the entry for the rest.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;

/// A cached value with its fetch time and tags.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub fetched_at: Instant,
    pub tags: Vec<String>,
}

impl<V> CacheEntry<V> {
    /// Check if this entry is still inside its validity window.
    pub fn is_valid(&self, window: Duration) -> bool {
        self.fetched_at.elapsed() < window
    }
}

pub struct TagCache<V> {
    window: Duration,
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    inflight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<V: Clone> TagCache<V> {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            entries: RwLock::new(HashMap::new()),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// The cached value for `key`, if present and still valid.
    pub fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|entry| entry.is_valid(self.window))
            .map(|entry| entry.value.clone())
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn insert(&self, key: &str, value: V, tags: &[&str]) {
        let entry = CacheEntry {
            value,
            fetched_at: Instant::now(),
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
        };
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), entry);
    }

    /// Drop every entry carrying `tag`. Returns how many were dropped.
    pub fn invalidate_tag(&self, tag: &str) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| !entry.tags.iter().any(|t| t == tag));
        let removed = before - entries.len();
        debug!(tag = %tag, removed, "Invalidated cache tag");
        removed
    }

    /// Return the cached value or run `fetch` to fill it.
    ///
    /// Only one fetch per key runs at a time; callers that were waiting
    /// re-check the cache before fetching themselves. Failed fetches are not
    /// cached.
    ///
    /// # Errors
    ///
    /// Returns whatever error `fetch` returns.
    pub async fn get_or_try_insert_with<F, Fut, E>(
        &self,
        key: &str,
        tags: &[&str],
        fetch: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            debug!(key = %key, "Cache hit");
            return Ok(value);
        }

        let lock = {
            let mut inflight = self.inflight.lock().await;
            Arc::clone(
                inflight
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        let _guard = lock.lock().await;

        if let Some(value) = self.get(key) {
            debug!(key = %key, "Cache filled while waiting");
            return Ok(value);
        }

        debug!(key = %key, "Cache miss");
        let value = fetch().await?;
        self.insert(key, value.clone(), tags);
        Ok(value)
    }
}

impl<V> std::fmt::Debug for TagCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagCache")
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}
