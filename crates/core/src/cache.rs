//! Explicit query cache for list pages.
//!
//! Maps a [`QueryKey`] to the last fetched value and the instants at which
//! it goes stale and is dropped. Invalidation is an explicit call, made by
//! whoever performed the mutation, rather than ambient global state.
//!
//! Stale entries stay readable through [`QueryCache::get_entry`] so a view
//! can keep showing the previous page while a refetch is in flight. Only
//! [`QueryCache::get_fresh`] decides whether a fetch can be skipped.
//!
//! Every invalidation bumps a generation counter. A fetch that read the
//! counter before it started and finishes after an invalidation of its
//! resource is stored already stale. Expired entries are dropped on insert.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};

use crate::query::QueryKey;
use crate::types::Timestamp;

/// Freshness and retention windows for cached entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// How long after a fetch the entry may be served without refetching.
    pub stale_time: Duration,
    /// How long after a fetch the entry is kept at all.
    pub cache_time: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time: Duration::seconds(30),
            cache_time: Duration::minutes(5),
        }
    }
}

/// One cached value and its timing metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    pub value: V,
    pub fetched_at: Timestamp,
    pub stale_until: Timestamp,
    pub expires_at: Timestamp,
    /// Set by an invalidation call; forces the next read to refetch.
    pub invalidated: bool,
}

impl<V> CacheEntry<V> {
    pub fn is_fresh(&self, now: Timestamp) -> bool {
        !self.invalidated && now < self.stale_until
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }
}

/// Thread-safe map from query key to cached value.
#[derive(Debug, Default)]
pub struct QueryCache<V> {
    config: CacheConfig,
    state: RwLock<CacheState<V>>,
}

#[derive(Debug)]
struct CacheState<V> {
    entries: HashMap<QueryKey, CacheEntry<V>>,
    /// Bumped by every invalidation call.
    generation: u64,
    /// Generation of the latest invalidation touching each resource.
    invalidated_at: HashMap<String, u64>,
    /// Generation of the latest `invalidate_all`.
    all_invalidated_at: u64,
}

impl<V> Default for CacheState<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            generation: 0,
            invalidated_at: HashMap::new(),
            all_invalidated_at: 0,
        }
    }
}

impl<V> CacheState<V> {
    fn bump(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn stamp_resource(&mut self, resource: &str) {
        let generation = self.bump();
        self.invalidated_at.insert(resource.to_string(), generation);
    }

    /// Whether an invalidation covering `key` happened after `generation`.
    fn invalidated_since(&self, key: &QueryKey, generation: u64) -> bool {
        self.all_invalidated_at > generation
            || key
                .resource()
                .and_then(|resource| self.invalidated_at.get(resource))
                .is_some_and(|stamp| *stamp > generation)
    }
}

fn add_saturating(at: Timestamp, delta: Duration) -> Timestamp {
    at.checked_add_signed(delta)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

impl<V: Clone> QueryCache<V> {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            state: RwLock::new(CacheState::default()),
        }
    }

    pub fn config(&self) -> CacheConfig {
        self.config
    }

    /// Current invalidation generation.
    ///
    /// Take it before starting a fetch and hand it to
    /// [`QueryCache::insert_fetched`] so an invalidation that lands while the
    /// fetch is in flight is not lost.
    pub fn generation(&self) -> u64 {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }

    /// The value for `key` if it may be served without refetching.
    pub fn get_fresh(&self, key: &QueryKey) -> Option<V> {
        self.get_fresh_at(key, Utc::now())
    }

    pub fn get_fresh_at(&self, key: &QueryKey, now: Timestamp) -> Option<V> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .entries
            .get(key)
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| entry.value.clone())
    }

    /// The entry for `key`, stale or not.
    pub fn get_entry(&self, key: &QueryKey) -> Option<CacheEntry<V>> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.entries.get(key).cloned()
    }

    pub fn insert(&self, key: QueryKey, value: V) -> CacheEntry<V> {
        self.insert_at(key, value, Utc::now())
    }

    /// Store `value` as fetched at `now`, replacing any previous entry.
    ///
    /// Entries past their retention window are dropped first.
    pub fn insert_at(&self, key: QueryKey, value: V, now: Timestamp) -> CacheEntry<V> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        self.store(&mut state, key, value, now, false)
    }

    pub fn insert_fetched(&self, key: QueryKey, value: V, started: u64) -> CacheEntry<V> {
        self.insert_fetched_at(key, value, started, Utc::now())
    }

    /// Store the result of a fetch that began at generation `started`.
    ///
    /// If the key's resource was invalidated since then, the value is stored
    /// already stale: it stays readable as a placeholder but the next read
    /// refetches.
    pub fn insert_fetched_at(
        &self,
        key: QueryKey,
        value: V,
        started: u64,
        now: Timestamp,
    ) -> CacheEntry<V> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let invalidated = state.invalidated_since(&key, started);
        self.store(&mut state, key, value, now, invalidated)
    }

    fn store(
        &self,
        state: &mut CacheState<V>,
        key: QueryKey,
        value: V,
        now: Timestamp,
        invalidated: bool,
    ) -> CacheEntry<V> {
        state.entries.retain(|_, entry| !entry.is_expired(now));
        let entry = CacheEntry {
            value,
            fetched_at: now,
            stale_until: add_saturating(now, self.config.stale_time),
            expires_at: add_saturating(now, self.config.cache_time),
            invalidated,
        };
        state.entries.insert(key, entry.clone());
        entry
    }

    /// Mark one entry stale. Returns whether it existed.
    ///
    /// Fetches of the key's resource already in flight are stored stale too.
    pub fn invalidate(&self, key: &QueryKey) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(resource) = key.resource() {
            state.stamp_resource(resource);
        }
        match state.entries.get_mut(key) {
            Some(entry) => {
                entry.invalidated = true;
                true
            }
            None => false,
        }
    }

    /// Mark every page of `resource` stale. Returns the number of entries hit.
    pub fn invalidate_resource(&self, resource: &str) -> usize {
        let prefix = QueryKey::for_resource(resource);
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.stamp_resource(resource);
        let mut count = 0;
        for (key, entry) in state.entries.iter_mut() {
            if key.starts_with(&prefix) {
                entry.invalidated = true;
                count += 1;
            }
        }
        count
    }

    pub fn invalidate_all(&self) -> usize {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let generation = state.bump();
        state.all_invalidated_at = generation;
        for entry in state.entries.values_mut() {
            entry.invalidated = true;
        }
        state.entries.len()
    }

    /// Drop one entry entirely.
    pub fn remove(&self, key: &QueryKey) -> Option<V> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.entries.remove(key).map(|entry| entry.value)
    }

    /// Drop every entry past its retention window. Returns how many went.
    pub fn purge_expired(&self, now: Timestamp) -> usize {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let before = state.entries.len();
        state.entries.retain(|_, entry| !entry.is_expired(now));
        before - state.entries.len()
    }

    pub fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
