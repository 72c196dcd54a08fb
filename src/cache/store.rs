//! Backing stores for the intent cache

use crate::intent::Intent;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

/// A stored classification and the exact text it was computed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedIntent {
    pub text: String,
    pub intent: Intent,
}

/// Key/value storage behind [`super::IntentCache`]
pub trait IntentStore: Send + Sync {
    fn get(&self, key: &str) -> Option<CachedIntent>;
    fn insert(&self, key: String, entry: CachedIntent);
    fn clear(&self);
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
struct Entry {
    cached: CachedIntent,
    last_accessed: Instant,
}

/// Bounded in-memory store with least-recently-used eviction
#[derive(Debug)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
    max_entries: usize,
}

impl MemoryStore {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    /// Drop the least recently used quarter (at least one entry)
    fn evict_lru(&self, entries: &mut HashMap<String, Entry>) {
        let evict_count = (self.max_entries / 4).max(1);

        let mut by_access: Vec<_> = entries
            .iter()
            .map(|(k, e)| (k.clone(), e.last_accessed))
            .collect();
        by_access.sort_by_key(|(_, t)| *t);

        for (key, _) in by_access.into_iter().take(evict_count) {
            entries.remove(&key);
        }
    }
}

impl IntentStore for MemoryStore {
    fn get(&self, key: &str) -> Option<CachedIntent> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get_mut(key).map(|entry| {
            entry.last_accessed = Instant::now();
            entry.cached.clone()
        })
    }

    fn insert(&self, key: String, entry: CachedIntent) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            self.evict_lru(&mut entries);
        }

        entries.insert(
            key,
            Entry {
                cached: entry,
                last_accessed: Instant::now(),
            },
        );
    }

    fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(super::DEFAULT_MAX_ENTRIES)
    }
}

/// Store that keeps nothing; every lookup misses
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStore;

impl IntentStore for NoopStore {
    fn get(&self, _key: &str) -> Option<CachedIntent> {
        None
    }

    fn insert(&self, _key: String, _entry: CachedIntent) {}

    fn clear(&self) {}

    fn len(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    fn entry(text: &str) -> CachedIntent {
        CachedIntent {
            text: text.to_string(),
            intent: Intent::General,
        }
    }

    #[test]
    fn test_memory_store_round() {
        let store = MemoryStore::new(10);
        store.insert("k".to_string(), entry("hello"));
        assert_eq!(store.get("k"), Some(entry("hello")));
        assert_eq!(store.get("missing"), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let store = MemoryStore::new(4);
        for key in ["a", "b", "c", "d"] {
            store.insert(key.to_string(), entry(key));
            sleep(Duration::from_millis(2));
        }

        // Touch "a" so "b" becomes the oldest
        store.get("a");
        sleep(Duration::from_millis(2));
        store.insert("e".to_string(), entry("e"));

        assert_eq!(store.len(), 4);
        assert!(store.get("a").is_some());
        assert!(store.get("b").is_none());
        assert!(store.get("e").is_some());
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let store = MemoryStore::new(2);
        store.insert("a".to_string(), entry("a"));
        store.insert("b".to_string(), entry("b"));
        store.insert("a".to_string(), entry("a2"));
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("a").map(|e| e.text), Some("a2".to_string()));
    }

    #[test]
    fn test_noop_store() {
        let store = NoopStore;
        store.insert("k".to_string(), entry("x"));
        assert!(store.get("k").is_none());
        assert!(store.is_empty());
    }
}
