//! Cache manager implementation
//!
//! This module provides the main CacheManager struct: a bounded map with
//! per-entry TTL, least-recently-used eviction and optional persistence.

use crate::access_order::AccessOrder;
use crate::entry::CacheEntry;
use crate::errors::CacheError;
use crate::stats::{CacheHealth, CacheStats, EntryAccess, LookupCounts, DEFAULT_TOP_ENTRIES};
use crate::storage::StorageBackend;
use config::CacheConfig;
use core_types::{debug_log, SharedClock, SystemClock};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Entries and their access order, always mutated together under one lock
#[derive(Debug)]
struct CacheState<T> {
    entries: HashMap<String, CacheEntry<T>>,
    order: AccessOrder,
}

impl<T> CacheState<T> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: AccessOrder::new(),
        }
    }

    fn remove(&mut self, key: &str) -> Option<CacheEntry<T>> {
        self.order.remove(key);
        self.entries.remove(key)
    }
}

/// Persisted layout: entries in access order, oldest first
#[derive(Serialize)]
struct PersistedView<'a, T> {
    entries: Vec<(&'a str, &'a CacheEntry<T>)>,
}

#[derive(Deserialize)]
struct PersistedCache<T> {
    entries: Vec<(String, CacheEntry<T>)>,
}

/// In-process TTL + LRU cache
pub struct CacheManager<T> {
    config: Arc<CacheConfig>,
    state: Mutex<CacheState<T>>,
    storage: Option<Arc<dyn StorageBackend>>,
    clock: SharedClock,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<T> Debug for CacheManager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = match self.state.try_lock() {
            Ok(state) => state.entries.len().to_string(),
            Err(_) => "locked".to_string(),
        };

        f.debug_struct("CacheManager")
            .field("config", &self.config)
            .field("entries", &entries)
            .field("persistent", &self.is_persistent())
            .finish()
    }
}

impl<T> CacheManager<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + 'static,
{
    /// Create an in-memory cache. `persist` is ignored without a backend.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_parts(config, None, SystemClock::shared())
    }

    /// Create a cache mirrored into `storage` when `config.persist` is set
    pub fn with_storage(config: CacheConfig, storage: Arc<dyn StorageBackend>) -> Self {
        Self::with_parts(config, Some(storage), SystemClock::shared())
    }

    /// Create a cache with an explicit backend and clock.
    ///
    /// Previously persisted entries are loaded here; entries whose TTL has
    /// already elapsed are dropped before admission.
    pub fn with_parts(
        config: CacheConfig,
        storage: Option<Arc<dyn StorageBackend>>,
        clock: SharedClock,
    ) -> Self {
        if config.persist && storage.is_none() {
            tracing::warn!(
                storage_key = %config.storage_key,
                "cache persistence requested without a storage backend; running in memory only"
            );
        }

        let cache = Self {
            config: Arc::new(config),
            state: Mutex::new(CacheState::new()),
            storage,
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        };
        cache.load_persisted();
        cache
    }

    /// Insert or overwrite `key`. Evicts the least recently accessed entry
    /// when the cache is full and `key` is new.
    pub fn set(&self, key: &str, data: T, ttl: Option<Duration>) {
        let ttl_ms = ttl
            .map(|d| d.as_millis() as u64)
            .unwrap_or(self.config.default_ttl_ms);
        let now = self.clock.now_millis();

        let mut state = self.lock_state();
        if !state.entries.contains_key(key) && state.entries.len() >= self.config.max_size {
            if let Some(evicted) = state.order.pop_head() {
                state.entries.remove(&evicted);
                debug_log!("Evicted least recently used cache key {}", evicted);
            }
        }

        state
            .entries
            .insert(key.to_string(), CacheEntry::new(data, now, ttl_ms));
        state.order.touch(key);
        self.persist_locked(&state);
    }

    /// Fetch a live value. Expired entries are removed on discovery.
    pub fn get(&self, key: &str) -> Option<T> {
        self.access(key, |entry| entry.data.clone())
    }

    /// Whether a live entry exists. Same bookkeeping as `get`.
    pub fn has(&self, key: &str) -> bool {
        self.access(key, |_| ()).is_some()
    }

    pub fn delete(&self, key: &str) -> bool {
        let mut state = self.lock_state();
        let removed = state.remove(key).is_some();
        if removed {
            self.persist_locked(&state);
        }
        removed
    }

    pub fn clear(&self) {
        let mut state = self.lock_state();
        state.entries.clear();
        state.order.clear();
        self.persist_locked(&state);
    }

    /// Remove every expired entry and return how many were removed
    pub fn cleanup(&self) -> usize {
        let now = self.clock.now_millis();
        let mut state = self.lock_state();

        let before = state.entries.len();
        state.entries.retain(|_, entry| entry.is_valid(now));
        let removed = before - state.entries.len();

        if removed > 0 {
            let CacheState { entries, order } = &mut *state;
            order.retain(|key| entries.contains_key(key));
            self.persist_locked(&state);
            debug_log!("Cache {} cleanup removed {} expired entries", self.config.storage_key, removed);
        }
        removed
    }

    /// Load `key` through `loader` unless a live entry already exists.
    ///
    /// Loader failures are logged and never propagated.
    pub async fn preload<F, Fut, E>(&self, key: &str, loader: F, ttl: Option<Duration>)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        if self.contains_live(key) {
            return;
        }

        match loader().await {
            Ok(data) => self.set(key, data, ttl),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "cache preload failed");
            }
        }
    }

    /// Statistics with the default number of top entries
    pub fn stats(&self) -> CacheStats {
        self.stats_with_top(DEFAULT_TOP_ENTRIES)
    }

    pub fn stats_with_top(&self, top_n: usize) -> CacheStats {
        let now = self.clock.now_millis();
        let state = self.lock_state();

        let total_entries = state.entries.len();
        let valid_entries = state
            .entries
            .values()
            .filter(|entry| entry.is_valid(now))
            .count();

        let estimated_size_bytes = state
            .entries
            .values()
            .map(|entry| {
                serde_json::to_string(&entry.data)
                    .map(|json| json.len() * 2)
                    .unwrap_or(0)
            })
            .sum();

        let mut top_entries: Vec<EntryAccess> = state
            .entries
            .iter()
            .map(|(key, entry)| EntryAccess {
                key: key.clone(),
                access_count: entry.access_count,
                age_ms: entry.age_ms(now),
                remaining_ms: entry.remaining_ms(now),
            })
            .collect();
        top_entries.sort_by(|a, b| {
            b.access_count
                .cmp(&a.access_count)
                .then_with(|| a.key.cmp(&b.key))
        });
        top_entries.truncate(top_n);

        let counts = self.lookup_counts();
        CacheStats {
            total_entries,
            valid_entries,
            expired_entries: total_entries - valid_entries,
            estimated_size_bytes,
            hits: counts.hits,
            misses: counts.misses,
            hit_rate: counts.hit_ratio().unwrap_or(0.0),
            top_entries,
        }
    }

    /// Snapshot of a live entry without touching access bookkeeping
    pub fn peek_entry(&self, key: &str) -> Option<CacheEntry<T>> {
        let now = self.clock.now_millis();
        let state = self.lock_state();
        state
            .entries
            .get(key)
            .filter(|entry| entry.is_valid(now))
            .cloned()
    }

    /// Keys in access order, least recently accessed first
    pub fn keys(&self) -> Vec<String> {
        self.lock_state().order.iter().map(str::to_string).collect()
    }

    /// Stored entries, including expired ones not yet swept
    pub fn len(&self) -> usize {
        self.lock_state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the current contents to the backend, reporting failures
    pub fn persist_now(&self) -> Result<(), CacheError> {
        let state = self.lock_state();
        self.write_state(&state)
    }

    fn access<R>(&self, key: &str, read: impl FnOnce(&CacheEntry<T>) -> R) -> Option<R> {
        let now = self.clock.now_millis();
        let mut state = self.lock_state();

        let valid = match state.entries.get(key) {
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
            Some(entry) => entry.is_valid(now),
        };

        if !valid {
            state.remove(key);
            self.misses.fetch_add(1, Ordering::Relaxed);
            self.persist_locked(&state);
            return None;
        }

        state.order.touch(key);
        self.hits.fetch_add(1, Ordering::Relaxed);
        let entry = state.entries.get_mut(key)?;
        entry.record_access(now);
        Some(read(entry))
    }

    /// Live-entry check with lazy expiry but without counting a lookup
    fn contains_live(&self, key: &str) -> bool {
        let now = self.clock.now_millis();
        let mut state = self.lock_state();
        match state.entries.get(key).map(|entry| entry.is_valid(now)) {
            Some(true) => true,
            Some(false) => {
                state.remove(key);
                self.persist_locked(&state);
                false
            }
            None => false,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, CacheState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist_locked(&self, state: &CacheState<T>) {
        if !self.is_persistent() {
            return;
        }
        if let Err(e) = self.write_state(state) {
            tracing::warn!(
                storage_key = %self.config.storage_key,
                error = %e,
                "failed to persist cache; continuing in memory"
            );
        }
    }

    fn write_state(&self, state: &CacheState<T>) -> Result<(), CacheError> {
        let storage = match (&self.storage, self.config.persist) {
            (Some(storage), true) => storage,
            _ => return Err(CacheError::PersistenceDisabled),
        };

        let view = PersistedView {
            entries: state
                .order
                .iter()
                .filter_map(|key| state.entries.get(key).map(|entry| (key, entry)))
                .collect(),
        };
        let blob = serde_json::to_string(&view)?;
        storage.save(&self.config.storage_key, &blob)
    }

    fn load_persisted(&self) {
        let Some(storage) = self.storage.as_ref().filter(|_| self.config.persist) else {
            return;
        };

        let blob = match storage.load(&self.config.storage_key) {
            Ok(Some(blob)) => blob,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(storage_key = %self.config.storage_key, error = %e, "failed to read persisted cache");
                return;
            }
        };

        let persisted: PersistedCache<T> = match serde_json::from_str(&blob) {
            Ok(persisted) => persisted,
            Err(e) => {
                tracing::warn!(storage_key = %self.config.storage_key, error = %e, "discarding unreadable persisted cache");
                return;
            }
        };

        let now = self.clock.now_millis();
        let stored = persisted.entries.len();
        let live: Vec<(String, CacheEntry<T>)> = persisted
            .entries
            .into_iter()
            .filter(|(_, entry)| entry.is_valid(now))
            .collect();

        // Keep the most recently accessed entries when the blob exceeds capacity
        let skip = live.len().saturating_sub(self.config.max_size);
        let mut state = self.lock_state();
        for (key, entry) in live.into_iter().skip(skip) {
            state.order.touch(&key);
            state.entries.insert(key, entry);
        }

        let admitted = state.entries.len();
        debug_log!(
            "Loaded {} of {} persisted entries for {}",
            admitted,
            stored,
            self.config.storage_key
        );
        if admitted < stored {
            self.persist_locked(&state);
        }
    }
}

impl<T> CacheManager<T> {
    pub fn is_persistent(&self) -> bool {
        self.config.persist && self.storage.is_some()
    }

    /// Get current configuration
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    pub fn lookup_counts(&self) -> LookupCounts {
        LookupCounts {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl<T> CacheHealth for CacheManager<T>
where
    T: Send,
{
    fn lookup_counts(&self) -> LookupCounts {
        CacheManager::lookup_counts(self)
    }

    fn entry_count(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }
}
