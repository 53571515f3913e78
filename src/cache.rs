//! Explicit get-or-compute result cache.
//!
//! [`MemoCache`] remembers the successful result of an async computation per
//! key for the lifetime of the cache. It backs the catalog load and the
//! ingredient-id → report-URL resolution in [`crate::client::ReportClient`],
//! so repeated lookups in one session never hit the network twice.
//!
//! Failures are not stored: the next call for that key computes again.
//! Entries are never invalidated.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use tokio::sync::Mutex;
use tracing::debug;

/// Async memoisation table keyed by the computation's input.
pub struct MemoCache<K, V> {
    entries: Mutex<HashMap<K, V>>,
}

impl<K, V> Default for MemoCache<K, V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, or run `compute` and cache its
    /// `Ok` result.
    ///
    /// The lock is released while `compute` runs, so concurrent misses on
    /// the same key may both compute; the first result stored wins and is
    /// what every caller gets back from then on.
    pub async fn get_or_try_compute<F, Fut, E>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(v) = self.entries.lock().await.get(&key) {
            debug!("Cache hit: {:?}", key);
            return Ok(v.clone());
        }

        debug!("Cache miss: {:?}", key);
        let value = compute().await?;

        let mut entries = self.entries.lock().await;
        Ok(entries.entry(key).or_insert(value).clone())
    }

    /// True once a value for `key` has been stored.
    pub async fn is_computed(&self, key: &K) -> bool {
        self.entries.lock().await.contains_key(key)
    }

    /// Cached value for `key`, without computing.
    pub async fn get(&self, key: &K) -> Option<V> {
        self.entries.lock().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
