//! Process-local key/value cache with per-entry expiry
//!
//! Entries are evicted lazily when a lookup finds them expired, and in bulk
//! by a periodic sweep ([`Cache::spawn_sweeper`]) so that entries nobody
//! reads again do not accumulate. The cache is an explicitly constructed
//! value shared through `Arc`; losing it only costs a recompute.
//!
//! Time is read from [`tokio::time::Instant`], which lets tests drive expiry
//! with a paused clock.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Default time-to-live used by [`Cache::set_default`]
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// A cached value and the instant after which it is stale
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now > self.expires_at
    }
}

/// Thread-safe TTL cache
///
/// Mutations are serialized by an internal lock. No isolation is offered
/// between a `get` and a later `set` of the same key: concurrent misses may
/// both compute and the last writer wins.
#[derive(Debug)]
pub struct Cache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    default_ttl: Duration,
}

impl<V: Clone> Cache<V> {
    /// Create an empty cache using [`DEFAULT_TTL`]
    pub fn new() -> Self {
        Self::with_default_ttl(DEFAULT_TTL)
    }

    /// Create an empty cache with a custom default TTL
    pub fn with_default_ttl(default_ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
        }
    }

    /// Derive a deterministic key for a logical request
    ///
    /// Object keys are sorted recursively before encoding, so two parameter
    /// structures that differ only in key order produce the same key. Array
    /// order is preserved.
    pub fn generate_key<P: Serialize + ?Sized>(
        prefix: &str,
        params: &P,
    ) -> Result<String, serde_json::Error> {
        let canonical = canonicalize(serde_json::to_value(params)?);
        let encoded = STANDARD.encode(serde_json::to_vec(&canonical)?);
        Ok(format!("{}:{}", prefix, encoded))
    }

    /// Fetch a live entry
    ///
    /// An expired entry is removed and reported as absent.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            match entries.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        // Another writer may have replaced the entry while the lock was released
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
        }
        None
    }

    /// Store a value for `ttl`, replacing any previous entry for the key
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), entry);
    }

    /// Store a value with the cache's default TTL
    pub fn set_default(&self, key: impl Into<String>, value: V) {
        self.set(key, value, self.default_ttl);
    }

    /// Remove an entry; returns whether one was present
    pub fn delete(&self, key: &str) -> bool {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some()
    }

    /// Remove every entry
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Remove all expired entries, returning how many were evicted
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Number of stored entries, expired or not
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}

impl<V: Clone + Send + Sync + 'static> Cache<V> {
    /// Start the periodic sweep on the current Tokio runtime
    ///
    /// The task only holds a weak reference: it exits once the cache is
    /// dropped, or when the returned handle is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> CacheSweeper {
        let cache = Arc::downgrade(self);
        let handle = tokio::spawn(sweep_loop(cache, interval));
        tracing::info!(interval_secs = interval.as_secs(), "Cache sweeper started");
        CacheSweeper { handle }
    }
}

impl<V: Clone> Default for Cache<V> {
    fn default() -> Self {
        Self::new()
    }
}

async fn sweep_loop<V: Clone + Send + Sync + 'static>(cache: Weak<Cache<V>>, interval: Duration) {
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let Some(cache) = cache.upgrade() else {
            tracing::debug!("Cache dropped, stopping sweeper");
            return;
        };
        let evicted = cache.sweep_expired();
        if evicted > 0 {
            tracing::info!(evicted, remaining = cache.len(), "Swept expired cache entries");
        }
    }
}

/// Handle to a running cache sweeper; aborts the task when dropped
#[derive(Debug)]
pub struct CacheSweeper {
    handle: JoinHandle<()>,
}

impl CacheSweeper {
    /// Stop the sweeper explicitly
    pub fn stop(self) {
        drop(self);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for CacheSweeper {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Rebuild a JSON value with object keys in sorted order at every depth
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut pairs: Vec<(String, Value)> = map.into_iter().collect();
            pairs.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                pairs
                    .into_iter()
                    .map(|(key, value)| (key, canonicalize(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
