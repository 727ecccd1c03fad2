//! ResultCache - bounded, monotonic cache of resolved names

use crate::types::IdentityMapping;
use chrono::{DateTime, Utc};
use lru::LruCache;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

struct CacheState {
    /// Most recently used first
    entries: LruCache<String, IdentityMapping>,
    /// key -> number of in-flight requests holding it
    pinned: HashMap<String, usize>,
}

impl Default for CacheState {
    fn default() -> Self {
        Self {
            entries: LruCache::unbounded(),
            pinned: HashMap::new(),
        }
    }
}

impl CacheState {
    fn evict_to(&mut self, capacity: usize) {
        while self.entries.len() > capacity {
            let victim = self
                .entries
                .iter()
                .rev()
                .map(|(key, _)| key)
                .find(|key| !self.pinned.contains_key(key.as_str()))
                .cloned();

            // Everything left is pinned; stay over capacity until flights finish.
            let Some(key) = victim else {
                break;
            };
            self.entries.pop(&key);
        }
    }
}

/// Map from normalized lookup key to the newest known mapping.
///
/// Writes are atomic per key. A `put` never replaces an entry with an older
/// or equally old mapping.
#[derive(Default)]
pub struct ResultCache {
    state: Mutex<CacheState>,
    capacity: Option<usize>,
    ttl: Option<Duration>,
}

impl ResultCache {
    /// Create an unbounded cache whose entries never go stale
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the number of entries (least recently used are evicted first)
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity.max(1));
        self
    }

    /// Mark entries older than `ttl` as stale
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the stored mapping, fresh or stale
    pub fn get(&self, key: &str) -> Option<IdentityMapping> {
        self.state().entries.get(key).cloned()
    }

    /// Get the stored mapping only if it is still fresh at `now`
    pub fn get_fresh(&self, key: &str, now: DateTime<Utc>) -> Option<IdentityMapping> {
        self.get(key).filter(|mapping| self.is_fresh(mapping, now))
    }

    /// Check a mapping against the configured TTL
    pub fn is_fresh(&self, mapping: &IdentityMapping, now: DateTime<Utc>) -> bool {
        let Some(ttl) = self.ttl else {
            return true;
        };
        match now.signed_duration_since(mapping.resolved_at()).to_std() {
            Ok(age) => age < ttl,
            // resolved_at lies in the future
            Err(_) => true,
        }
    }

    /// Store a mapping. Returns false when an equal or newer entry was kept.
    pub fn put(&self, key: &str, mapping: IdentityMapping) -> bool {
        let mut state = self.state();

        if let Some(existing) = state.entries.peek(key) {
            if existing.resolved_at() >= mapping.resolved_at() {
                return false;
            }
        }
        state.entries.put(key.to_string(), mapping);

        if let Some(capacity) = self.capacity {
            state.evict_to(capacity);
        }
        true
    }

    /// Protect a key from eviction while a request for it is in flight
    pub fn pin(&self, key: &str) {
        *self.state().pinned.entry(key.to_string()).or_default() += 1;
    }

    /// Release one pin taken with [`ResultCache::pin`]
    pub fn unpin(&self, key: &str) {
        let mut state = self.state();
        if let Some(count) = state.pinned.get_mut(key) {
            *count -= 1;
            if *count == 0 {
                state.pinned.remove(key);
            }
        }
        if let Some(capacity) = self.capacity {
            state.evict_to(capacity);
        }
    }

    /// Every stored mapping, most recently used first, without touching recency
    pub fn mappings(&self) -> Vec<IdentityMapping> {
        self.state().entries.iter().map(|(_, mapping)| mapping.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &str) -> bool {
        self.state().entries.contains(key)
    }

    pub fn clear(&self) {
        self.state().entries.clear();
    }
}
